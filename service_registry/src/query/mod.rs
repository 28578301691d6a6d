//! Filtering and ranking of lookup candidates.
//!
//! Queries are a small, sandboxed expression language evaluated against a
//! namespace made of the service's attributes with its registration properties
//! layered on top:
//!
//! ```text
//! active and tag == 'x'
//! weight >= 2 and not (name in ['legacy', 'test'])
//! config.port == 8080 or tags[0] == "primary"
//! ```
//!
//! A query that fails to parse, or fails to evaluate for a given candidate,
//! never surfaces as an error from a lookup. It just doesn't match.

mod eval;
mod lexer;
mod parser;
mod ranking;

use std::{
	fmt,
	sync::Arc,
};

use serde_json::Value;
use thiserror::Error;

use crate::{
	Properties,
	Service,
	ServiceId,
	ServiceRef,
};

pub use eval::EvalError;
use ranking::Direction;


/// A query string that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid query at offset {offset}: {message}")]
pub struct QueryParseError {
	pub offset: usize,
	pub message: String,
}

impl QueryParseError {
	pub(crate) fn new(offset: usize, message: impl Into<String>) -> QueryParseError {
		return QueryParseError {
			offset,
			message: message.into(),
		};
	}
}

/// A parsed query expression
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	source: String,
	expr: parser::Expr,
}

impl Query {
	pub fn parse(source: &str) -> Result<Query, QueryParseError> {
		let tokens = lexer::tokenize(source)?;
		let expr = parser::parse(&tokens, source.len())?;
		return Ok(Query {
			source: String::from(source),
			expr,
		});
	}

	pub fn source(&self) -> &str {
		return &self.source;
	}

	/// Evaluates the query and applies truthiness to the result
	pub fn evaluate(&self, namespace: &Properties) -> Result<bool, EvalError> {
		let value = eval::evaluate(&self.expr, namespace)?;
		return Ok(eval::truthy(&value));
	}
}

/// Builds the namespace a query is evaluated in. Properties win over attributes
/// with the same name.
pub fn namespace(service: &dyn Service, properties: &Properties) -> Properties {
	let mut namespace = service.attributes();
	for (key, value) in properties {
		namespace.insert(key.clone(), value.clone());
	}
	return namespace;
}

type PredicateFn = dyn Fn(&dyn Service, &Properties) -> bool + Send + Sync;

/// A typed filter callback. Runs with the registry locked, so it must not call
/// back into the registry.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
	pub fn new(predicate: impl Fn(&dyn Service, &Properties) -> bool + Send + Sync + 'static) -> Predicate {
		return Predicate(Arc::new(predicate));
	}
}

impl fmt::Debug for Predicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str("Predicate");
	}
}

/// Describes which services a lookup returns and in what order.
///
/// An empty `Lookup` returns every service registered against the protocol, in
/// registration order. If both `minimize` and `maximize` are set, `minimize` wins.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
	query: Option<Result<Query, QueryParseError>>,
	predicate: Option<Predicate>,
	minimize: Option<String>,
	maximize: Option<String>,
}

pub(crate) struct Candidate {
	service: ServiceRef,
	rank: Option<Value>,
}

impl Lookup {
	pub fn new() -> Lookup {
		return Lookup::default();
	}

	/// Filters with a query string. A blank string means no filtering.
	pub fn query(mut self, query: impl AsRef<str>) -> Lookup {
		let query = query.as_ref();
		if query.trim().is_empty() {
			self.query = None;
		} else {
			self.query = Some(Query::parse(query));
		}
		return self;
	}

	/// Filters with an already-parsed query
	pub fn with_query(mut self, query: Query) -> Lookup {
		self.query = Some(Ok(query));
		return self;
	}

	/// Filters with a callback. Combined with a query, both must accept.
	pub fn filter(mut self, predicate: impl Fn(&dyn Service, &Properties) -> bool + Send + Sync + 'static) -> Lookup {
		self.predicate = Some(Predicate::new(predicate));
		return self;
	}

	/// Sorts ascending by the named attribute or property
	pub fn minimize(mut self, key: impl Into<String>) -> Lookup {
		self.minimize = Some(key.into()).filter(|key: &String| !key.is_empty());
		return self;
	}

	/// Sorts descending by the named attribute or property
	pub fn maximize(mut self, key: impl Into<String>) -> Lookup {
		self.maximize = Some(key.into()).filter(|key: &String| !key.is_empty());
		return self;
	}

	fn ranking(&self) -> Option<(&str, Direction)> {
		if let Some(key) = &self.minimize {
			return Some((key.as_str(), Direction::Ascending));
		}
		if let Some(key) = &self.maximize {
			return Some((key.as_str(), Direction::Descending));
		}
		return None;
	}

	/// Decides whether a service is part of the result, and captures its rank key
	pub(crate) fn candidate(&self, id: ServiceId, service: ServiceRef, properties: &Properties) -> Option<Candidate> {
		if let Some(predicate) = &self.predicate {
			if !(predicate.0)(&*service, properties) {
				return None;
			}
		}

		let rank_by = self.ranking();
		if self.query.is_none() && rank_by.is_none() {
			return Some(Candidate {
				service,
				rank: None,
			});
		}

		let namespace = namespace(&*service, properties);
		match &self.query {
			Some(Ok(query)) => match query.evaluate(&namespace) {
				Ok(true) => {},
				Ok(false) => return None,
				Err(error) => {
					tracing::debug!("query `{}` failed for service <{}>: {}", query.source(), id, error);
					return None;
				},
			},
			Some(Err(error)) => {
				tracing::debug!("ignoring service <{}>: {}", id, error);
				return None;
			},
			None => {},
		}

		let rank = rank_by
			.and_then(|(key, _)| namespace.get(key))
			.filter(|value| ranking::is_rankable(value))
			.cloned();
		return Some(Candidate {
			service,
			rank,
		});
	}

	/// Applies the ranking, if any, and strips the bookkeeping
	pub(crate) fn finish(&self, candidates: Vec<Candidate>) -> Vec<ServiceRef> {
		let mut ranked: Vec<(ServiceRef, Option<Value>)> = candidates
			.into_iter()
			.map(|candidate| (candidate.service, candidate.rank))
			.collect();
		if let Some((_, direction)) = self.ranking() {
			ranking::sort_ranked(&mut ranked, direction);
		}
		return ranked.into_iter().map(|(service, _)| service).collect();
	}
}
