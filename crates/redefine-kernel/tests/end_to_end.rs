//! End-to-end wiring: declarations, substitutes, and the exports read back.

use redefine_kernel::{Factory, Harness, RedefineError, Substitute, Value};
use serde_json::json;
use std::cell::Cell;
use std::fmt;

#[derive(Default)]
struct Spy {
    calls: Cell<usize>,
}

impl Spy {
    fn mark(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

/// Renders as a binding name, like an object with a custom `toString`.
struct NameTag(&'static str);

impl fmt::Display for NameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn identity() -> Factory {
    Factory::function(|call| Ok(call.dependency(0).cloned()))
}

fn mark_dependency() -> Factory {
    Factory::function(|call| {
        let spy = call
            .expect_dependency(0)?
            .downcast_ref::<Spy>()
            .ok_or_else(|| RedefineError::factory("dependency is not a spy"))?;
        spy.mark();
        Ok(None)
    })
}

fn spy_calls(value: &Value) -> usize {
    value.downcast_ref::<Spy>().expect("spy").calls.get()
}

#[test]
fn plain_object_factory_is_the_exports() {
    let harness = Harness::new();
    harness.define(
        Vec::<String>::new(),
        Factory::function(|_| Ok(Some(Value::json(json!({"name": "one"}))))),
    );
    harness.redefine().save_as("one").unwrap();

    assert_eq!(harness.exports("one").unwrap().to_json(), json!({"name": "one"}));
}

#[test]
fn literal_substitute_reaches_the_factory() {
    let harness = Harness::new();
    harness.define(["one"], mark_dependency());
    let spy = Value::new(Spy::default());
    harness.redefine().save_as("foo").unwrap().let_("one").be(spy.clone());

    harness.exports("foo").unwrap();
    assert_eq!(spy_calls(&spy), 1);
}

#[test]
fn string_substitute_links_to_another_binding() {
    let harness = Harness::new();
    harness.define(["x"], identity());
    harness.define(["y"], mark_dependency());
    let spy = Value::new(Spy::default());
    harness.redefine().save_as("a").unwrap().let_("x").be(spy.clone());
    harness.redefine().save_as("b").unwrap().let_("y").be("a");

    harness.exports("b").unwrap();
    harness.exports("b").unwrap();
    assert_eq!(spy_calls(&spy), 1);
    assert!(harness.exports("a").unwrap().same(&spy));
}

#[test]
fn from_exports_keeps_strings_literal() {
    let harness = Harness::new();
    harness.define(
        ["dep"],
        Factory::function(|call| {
            let object = Value::exports_object();
            if let Some(exports) = object.as_exports() {
                exports.set("one", call.expect_dependency(0)?.clone());
            }
            Ok(Some(object))
        }),
    );
    harness
        .redefine()
        .save_as("foo")
        .unwrap()
        .let_("dep")
        .be("LITERAL_STRING")
        .from()
        .exports();

    let exports = harness.exports("foo").unwrap();
    let one = exports.as_exports().and_then(|e| e.get("one")).expect("one");
    assert_eq!(one.as_str(), Some("LITERAL_STRING"));
}

#[test]
fn from_redefine_coerces_values_to_names() {
    let harness = Harness::new();
    harness.define(["one"], identity());
    harness.define(["two"], mark_dependency());
    let spy = Value::new(Spy::default());
    harness.redefine().save_as("foo").unwrap().let_("one").be(spy.clone());
    harness
        .redefine()
        .save_as("bar")
        .unwrap()
        .let_("two")
        .be(Value::displayable(NameTag("foo")))
        .from()
        .redefine();

    harness.exports("bar").unwrap();
    assert_eq!(spy_calls(&spy), 1);
}

#[test]
fn explicit_intent_overrides_the_string_default() {
    let harness = Harness::new();
    harness.define(["dep"], identity());
    harness
        .redefine()
        .save_as("foo")
        .unwrap()
        .let_("dep")
        .be(Substitute::literal(Value::text("not a name")));

    assert_eq!(harness.exports("foo").unwrap().as_str(), Some("not a name"));
}

#[test]
fn partial_claims_block_exports() {
    let harness = Harness::new();
    harness.define(Vec::<String>::new(), Factory::value(Value::text("a")));
    harness.define(Vec::<String>::new(), Factory::value(Value::text("b")));
    harness.redefine().save_as("a").unwrap();

    assert_eq!(
        harness.exports("a").unwrap_err(),
        RedefineError::UnbalancedDeclarations {
            claimed: 1,
            declared: 2,
        }
    );
}

#[test]
fn missing_substitute_is_unresolved() {
    let harness = Harness::new();
    harness.define(["never/bound"], identity());
    harness.redefine().save_as("lonely").unwrap();

    assert_eq!(
        harness.exports("lonely").unwrap_err(),
        RedefineError::UnresolvedDependency {
            binding: "lonely".into(),
            dependency: "never/bound".into(),
        }
    );
}

#[test]
fn sample_four_wiring() {
    let harness = Harness::new();
    harness.define_default(Factory::value(Value::json(json!({"name": "one"}))));
    harness.define(["two/three/three"], Factory::function(|call| {
        let object = Value::exports_object();
        if let Some(exports) = object.as_exports() {
            exports.set("name", Value::text("two"));
            exports.set("three", call.expect_dependency(0)?.clone());
        }
        Ok(Some(object))
    }));
    harness.define_default(Factory::value(Value::json(json!({"name": "three"}))));
    harness.define(
        ["one/one", "two/two", "not/used"],
        Factory::function(|call| {
            let object = Value::exports_object();
            if let Some(exports) = object.as_exports() {
                exports.set("one", call.expect_dependency(0)?.clone());
                exports.set("two", call.expect_dependency(1)?.clone());
            }
            Ok(Some(object))
        }),
    );

    harness.redefine().save_as("my_one").unwrap();
    harness
        .redefine()
        .save_as("my_two")
        .unwrap()
        .let_("two/three/three")
        .be("my_three");
    harness.redefine().save_as("my_three").unwrap();
    harness
        .redefine()
        .save_as("my_four")
        .unwrap()
        .let_("one/one")
        .be("my_one")
        .from()
        .redefine()
        .let_("two/two")
        .be("my_two")
        .let_("not/used")
        .be("not_used_exports")
        .from()
        .exports();

    assert_eq!(
        harness.exports("my_four").unwrap().to_json(),
        json!({
            "one": {"name": "one"},
            "two": {"name": "two", "three": {"name": "three"}},
        })
    );
    assert_eq!(harness.debug().exports_cache.len(), 4);
}
