use std::cmp::Ordering;

use serde_json::Value;

use super::eval::order_values;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
	Ascending,
	Descending,
}

/// Kinds that can take part in ranking, in the order they sort in
fn rank_class(value: &Value) -> Option<u8> {
	return match value {
		Value::Null => Some(0),
		Value::Bool(_) => Some(1),
		Value::Number(_) => Some(2),
		Value::String(_) => Some(3),
		Value::Array(_) | Value::Object(_) => None,
	};
}

/// Whether a ranking key is usable at all. Unusable keys sort last.
pub(crate) fn is_rankable(value: &Value) -> bool {
	return rank_class(value).is_some();
}

fn compare_keys(a: &Value, b: &Value) -> Ordering {
	return match (rank_class(a), rank_class(b)) {
		(Some(class_a), Some(class_b)) if class_a != class_b => class_a.cmp(&class_b),
		_ => order_values(a, b).unwrap_or(Ordering::Equal),
	};
}

/// Stable sort by key. Items without a usable key keep their relative order
/// after every ranked item, whichever the direction.
pub(crate) fn sort_ranked<T>(items: &mut [(T, Option<Value>)], direction: Direction) {
	items.sort_by(|(_, a), (_, b)| {
		return match (a, b) {
			(Some(a), Some(b)) => match direction {
				Direction::Ascending => compare_keys(a, b),
				Direction::Descending => compare_keys(b, a),
			},
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		};
	});
}
