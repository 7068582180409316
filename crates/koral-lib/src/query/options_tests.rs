use serde_json::json;

use super::{CompileOptions, QueryBuilder};
use crate::compile::DEFAULT_RECURSION_FUEL;

#[test]
fn defaults() {
    let options: CompileOptions = serde_json::from_str("{}").unwrap();

    assert_eq!(options, CompileOptions::default());
    assert_eq!(options.version, None);
    assert!(!options.lenient);
    assert_eq!(options.recursion_fuel, Some(DEFAULT_RECURSION_FUEL));
}

#[test]
fn camel_case_keys() {
    let options = CompileOptions {
        version: Some("0.3".into()),
        lenient: true,
        recursion_fuel: None,
    };

    assert_eq!(
        serde_json::to_value(&options).unwrap(),
        json!({ "version": "0.3", "lenient": true, "recursionFuel": null })
    );

    let parsed: CompileOptions =
        serde_json::from_value(json!({ "recursionFuel": 16, "version": "1.0" })).unwrap();
    assert_eq!(parsed.recursion_fuel, Some(16));
    assert!(!parsed.lenient);
}

#[test]
fn options_replace_builder_settings() {
    let options: CompileOptions =
        serde_json::from_value(json!({ "version": "0.2", "lenient": true })).unwrap();
    let query = QueryBuilder::from_notation("annis", "(tok key=a)")
        .version("1.0")
        .options(options)
        .build();

    assert_eq!(query.version().to_string(), "0.3");
    assert!(query.to_json()["@context"].as_str().unwrap().contains("koral/0.3"));
}
