use serde_json::json;

use crate::{
	EvalError,
	Lookup,
	Properties,
	Protocol,
	Query,
	ServiceRegistry,
};
use super::{
	light,
	props,
	Light,
};


fn eval(query: &str, namespace: serde_json::Value) -> Result<bool, EvalError> {
	return Query::parse(query).expect("query should parse").evaluate(&props(namespace));
}

fn matching_names(registry: &ServiceRegistry, protocol: &Protocol, lookup: Lookup) -> Vec<String> {
	return registry.get_services_as::<Light>(protocol, &lookup)
		.unwrap()
		.iter()
		.map(|light| light.name.clone())
		.collect();
}

#[test]
fn query_sees_attributes_and_properties() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("tagged", true), props(json!({ "tag": "x" })));
	registry.register_instance(lights.clone(), light("other", true), props(json!({ "tag": "y" })));

	assert_eq!(matching_names(&registry, &lights, Lookup::new().query("active and tag=='x'")), vec!["tagged"]);
	assert_eq!(matching_names(&registry, &lights, Lookup::new().query("   ")), vec!["tagged", "other"]);
}

#[test]
fn failing_queries_match_nothing() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("a", true), props(json!({ "tag": "x" })));

	assert!(matching_names(&registry, &lights, Lookup::new().query("nonexistent_name")).is_empty());
	assert!(matching_names(&registry, &lights, Lookup::new().query("active and (")).is_empty());
	assert!(matching_names(&registry, &lights, Lookup::new().query("tag < 3")).is_empty());
}

#[test]
fn one_bad_candidate_does_not_spoil_the_rest() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("a", true), props(json!({ "port": 80 })));
	registry.register_instance(lights.clone(), light("b", true), Properties::new());
	registry.register_instance(lights.clone(), light("c", true), props(json!({ "port": 81 })));

	// `b` has no port, so its evaluation fails before `or` is reached
	let found = matching_names(&registry, &lights, Lookup::new().query("port == 80 or name == 'b'"));
	assert_eq!(found, vec!["a"]);
}

#[test]
fn properties_shadow_attributes() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("attribute", true), props(json!({ "name": "property" })));

	assert!(matching_names(&registry, &lights, Lookup::new().query("name == 'attribute'")).is_empty());
	assert_eq!(matching_names(&registry, &lights, Lookup::new().query("name == 'property'")), vec!["attribute"]);
}

#[test]
fn predicates_combine_with_queries() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("stage-on", true), props(json!({ "zone": "stage" })));
	registry.register_instance(lights.clone(), light("stage-off", false), props(json!({ "zone": "stage" })));
	registry.register_instance(lights.clone(), light("loose", true), Properties::new());

	let zoned = Lookup::new().filter(|_, properties| properties.contains_key("zone"));
	assert_eq!(matching_names(&registry, &lights, zoned.clone()), vec!["stage-on", "stage-off"]);
	assert_eq!(matching_names(&registry, &lights, zoned.query("active")), vec!["stage-on"]);

	let typed = Lookup::new().filter(|service, _| crate::namespace(service, &Properties::new()).get("active") == Some(&json!(false)));
	assert_eq!(matching_names(&registry, &lights, typed), vec!["stage-off"]);
}

#[test]
fn boolean_precedence() {
	let namespace = json!({ "a": true, "b": false, "c": false });
	assert_eq!(eval("a or b and c", namespace.clone()), Ok(true));
	assert_eq!(eval("(a or b) and c", namespace.clone()), Ok(false));
	assert_eq!(eval("not b and a", namespace.clone()), Ok(true));
	assert_eq!(eval("not a == False", namespace.clone()), Ok(true));
	assert_eq!(eval("b and missing", namespace.clone()), Ok(false));
	assert_eq!(eval("a or missing", namespace), Ok(true));
}

#[test]
fn empty_and_zero_values_are_falsy() {
	let namespace = json!({ "zero": 0, "empty": "", "none": null, "list": [], "map": {}, "word": "hi", "half": 0.5 });
	for falsy in ["zero", "empty", "none", "list", "map"] {
		assert_eq!(eval(falsy, namespace.clone()), Ok(false), "{} should be falsy", falsy);
	}
	assert_eq!(eval("word and half", namespace), Ok(true));
}

#[test]
fn comparisons_and_membership() {
	let namespace = json!({
		"weight": 3,
		"ratio": 1.5,
		"name": "spot",
		"tags": ["front", "wash"],
		"cfg": { "port": 8080, "host": "local" },
	});

	assert_eq!(eval("weight >= 3 and weight < 4", namespace.clone()), Ok(true));
	assert_eq!(eval("weight == 3.0", namespace.clone()), Ok(true));
	assert_eq!(eval("ratio > 1", namespace.clone()), Ok(true));
	assert_eq!(eval("-weight < 0", namespace.clone()), Ok(true));
	assert_eq!(eval("name != 'flood'", namespace.clone()), Ok(true));
	assert_eq!(eval("name > 'alpha'", namespace.clone()), Ok(true));
	assert_eq!(eval("'wash' in tags", namespace.clone()), Ok(true));
	assert_eq!(eval("'po' in name", namespace.clone()), Ok(true));
	assert_eq!(eval("'port' in cfg", namespace.clone()), Ok(true));
	assert_eq!(eval("weight not in [1, 2,]", namespace.clone()), Ok(true));
	assert_eq!(eval("cfg.port == 8080", namespace.clone()), Ok(true));
	assert_eq!(eval("cfg['host'] == \"local\"", namespace.clone()), Ok(true));
	assert_eq!(eval("tags[-1] == 'wash' and tags[0] == 'front'", namespace.clone()), Ok(true));
	assert_eq!(eval("tags == ['front', 'wash']", namespace), Ok(true));
}

#[test]
fn evaluation_errors() {
	let namespace = json!({ "name": "spot", "tags": ["front"], "cfg": {} });

	assert_eq!(eval("missing", namespace.clone()), Err(EvalError::UnknownName(String::from("missing"))));
	assert_eq!(eval("cfg.port", namespace.clone()), Err(EvalError::MissingMember(String::from("port"))));
	assert_eq!(eval("tags[3]", namespace.clone()), Err(EvalError::IndexOutOfRange(3)));
	assert_eq!(eval("-name", namespace.clone()), Err(EvalError::BadNegation("string")));
	assert_eq!(
		eval("name < 1", namespace.clone()),
		Err(EvalError::Incomparable { op: "<", lhs: "string", rhs: "number" }),
	);
	assert_eq!(
		eval("1 in name", namespace),
		Err(EvalError::Incomparable { op: "in", lhs: "number", rhs: "string" }),
	);
}

#[test]
fn parse_errors_report_offsets() {
	let error = Query::parse("weight = 3").unwrap_err();
	assert_eq!(error.offset, 7);

	let error = Query::parse("weight ==").unwrap_err();
	assert_eq!(error.offset, 9);
	assert_eq!(error.message, "unexpected end of query");

	let error = Query::parse("1 < weight < 3").unwrap_err();
	assert_eq!(error.offset, 11);
	assert!(error.message.contains("chained"));

	assert!(Query::parse("name == 'open").unwrap_err().message.contains("unterminated"));
	assert!(Query::parse("(active").unwrap_err().message.contains("expected `)`"));
	assert!(Query::parse("active active").unwrap_err().message.contains("unexpected name"));
	assert!(Query::parse("cfg.").is_err());
	assert!(Query::parse("a # b").is_err());
}

#[test]
fn out_of_range_numbers_do_not_parse() {
	let error = Query::parse("weight == 1e999").unwrap_err();
	assert_eq!(error.offset, 10);
	assert!(error.message.contains("out of range"));
	assert!(Query::parse("weight == -1e999").is_err());
	assert!(Query::parse("weight == 1e300").is_ok());
}

#[test]
fn deep_nesting_is_a_parse_error() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("a", true), Properties::new());

	let nested = format!("{}active{}", "(".repeat(200_000), ")".repeat(200_000));
	assert!(Query::parse(&nested).unwrap_err().message.contains("nests deeper"));
	assert!(registry.get_services(&lights, &Lookup::new().query(&nested)).unwrap().is_empty());

	let negated = format!("{}active", "not ".repeat(100_000));
	assert!(Query::parse(&negated).is_err());
	let chained = vec!["active"; 100_000].join(" and ");
	assert!(Query::parse(&chained).is_err());
	let members = format!("cfg{}", ".x".repeat(100_000));
	assert!(Query::parse(&members).is_err());

	let moderate = format!("{}active{}", "(".repeat(20), ")".repeat(20));
	assert_eq!(registry.get_services(&lights, &Lookup::new().query(&moderate)).unwrap().len(), 1);
}

#[test]
fn parsed_queries_can_be_reused() {
	let registry = ServiceRegistry::new();
	let lights = Protocol::named("test.light");
	registry.register_instance(lights.clone(), light("a", true), Properties::new());

	let query = Query::parse("active").unwrap();
	assert_eq!(query.source(), "active");
	assert_eq!(matching_names(&registry, &lights, Lookup::new().with_query(query)), vec!["a"]);
}
