//! End-to-end profile scenarios driven through the memory host.
//!
//! The fixture is a `book` model with one ungated rule (numeric `rating`)
//! and two profiles: `soft` requires `name` present, `hard` requires `name`
//! to match a prefix format and `author` to be present.

use kavach::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn book_engine() -> ProfileEngine {
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("book"));

    // Ungated: applies whatever the active profile is.
    let mut common = RuleSet::new();
    common
        .declare("validates_numericality_of", vec![Value::symbol("rating")])
        .unwrap();
    engine.apply_rule_set("book", &common).unwrap();

    let mut soft = RuleSet::new();
    soft.declare("validates_presence_of", vec![Value::symbol("name")])
        .unwrap();
    engine
        .declare_profile("book", "soft")
        .rules(&soft)
        .apply()
        .unwrap();

    engine
        .declare_profile("book", "hard")
        .define(|rules| {
            rules
                .rule(
                    "validates_format_of",
                    vec![Value::symbol("name"), Value::string("ISBN ")],
                )
                .rule("validates_presence_of", vec![Value::symbol("author")]);
        })
        .apply()
        .unwrap();

    engine
}

fn failed_fields(failures: &[Failure]) -> Vec<&str> {
    failures.iter().map(|failure| failure.field.as_str()).collect()
}

#[test]
fn fresh_book_fails_only_the_ungated_rule() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failed_fields(&failures), vec!["rating"]);
}

#[test]
fn soft_profile_adds_the_presence_check() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();

    engine.switch_to(&shared(&book), "soft").unwrap();

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failures.len(), 2);
    let fields = failed_fields(&failures);
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"rating"));
}

#[test]
fn hard_profile_adds_format_and_author_checks() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();

    engine.switch_to(&shared(&book), "hard").unwrap();

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failures.len(), 3);
    let fields = failed_fields(&failures);
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"author"));
    assert!(fields.contains(&"rating"));
}

#[test]
fn satisfied_rules_stop_failing() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();
    {
        let mut instance = book.borrow_mut();
        instance.put("name", Value::string("ISBN 978-0307474278"));
        instance.put("author", Value::string("Roberto Bolano"));
        instance.put("rating", Value::Integer(5));
    }

    engine.switch_to(&shared(&book), "hard").unwrap();

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
}

#[test]
fn switching_to_an_undeclared_profile_fails_and_keeps_state() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();
    engine.switch_to(&shared(&book), "soft").unwrap();

    let result = engine.switch_to(&shared(&book), "bogus");

    assert_eq!(
        result,
        Err(SwitchError::UnknownProfile {
            model: "book".to_string(),
            name: "bogus".into(),
        })
    );
    assert_eq!(book.borrow().active_profile(), Some("soft".into()));
}

#[test]
fn clear_profile_runs_only_ungated_rules() {
    init_logging();
    let engine = book_engine();
    let book = MemoryRecord::create(&engine, "book").unwrap();

    engine.switch_to(&shared(&book), "hard").unwrap();
    engine.clear_profile(&shared(&book));

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failed_fields(&failures), vec!["rating"]);
}

#[test]
fn default_profile_is_active_right_after_construction() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("invoice"));
    engine
        .declare_profile("invoice", "strict")
        .default(true)
        .define(|rules| {
            rules.rule("validates_presence_of", vec![Value::symbol("number")]);
        })
        .apply()
        .unwrap();

    let invoice = MemoryRecord::create(&engine, "invoice").unwrap();

    assert_eq!(invoice.borrow().active_profile(), Some("strict".into()));
    let failures = MemoryRecord::validate(&engine, &invoice).unwrap();
    assert_eq!(failed_fields(&failures), vec!["number"]);
}

#[test]
fn has_profile_reflects_declarations() {
    init_logging();
    let engine = book_engine();

    assert!(engine.has_profile("book", "soft"));
    assert!(engine.has_profile("book", "hard"));
    assert!(!engine.has_profile("book", "bogus"));
    assert!(!engine.has_profile("shelf", "soft"));
}

#[test]
fn redeclared_profile_accumulates_rules() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("book"));

    let mut first = RuleSet::new();
    first
        .declare("validates_presence_of", vec![Value::symbol("name")])
        .unwrap();
    engine
        .declare_profile("book", "soft")
        .rules(&first)
        .apply()
        .unwrap();

    let mut second = RuleSet::new();
    second
        .declare("validates_presence_of", vec![Value::symbol("author")])
        .unwrap();
    engine
        .declare_profile("book", "soft")
        .rules(&second)
        .apply()
        .unwrap();

    let book = MemoryRecord::create(&engine, "book").unwrap();
    engine.switch_to(&shared(&book), "soft").unwrap();

    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failures.len(), 2);
}

#[test]
fn second_default_keeps_first_and_warns() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("book"));
    engine
        .declare_profile("book", "soft")
        .default(true)
        .apply()
        .unwrap();
    engine
        .declare_profile("book", "hard")
        .default(true)
        .apply()
        .unwrap();

    let book = MemoryRecord::create(&engine, "book").unwrap();
    assert_eq!(book.borrow().active_profile(), Some("soft".into()));
}

#[test]
fn name_only_profile_is_switchable() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("book"));
    engine.declare_profile("book", "none_at_all").apply().unwrap();

    let book = MemoryRecord::create(&engine, "book").unwrap();
    engine.switch_to(&shared(&book), "none_at_all").unwrap();

    assert_eq!(book.borrow().active_profile(), Some("none_at_all".into()));
    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert!(failures.is_empty());
}

#[test]
fn rules_with_their_own_conditional_compose_with_the_profile_guard() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("book"));

    engine
        .declare_profile("book", "strict")
        .define(|rules| {
            rules
                .rule_guarded(
                    "validates_presence_of",
                    vec![Value::symbol("title")],
                    Guard::always(),
                )
                .rule_guarded(
                    "validates_presence_of",
                    vec![Value::symbol("isbn")],
                    Guard::never(),
                );
        })
        .apply()
        .unwrap();

    let book = MemoryRecord::create(&engine, "book").unwrap();

    // Without the profile active, neither rule fires: the membership half of
    // the composed guard is false.
    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert!(failures.is_empty());

    // With it active, the rule's own conditional still has the final word.
    engine.switch_to(&shared(&book), "strict").unwrap();
    let failures = MemoryRecord::validate(&engine, &book).unwrap();
    assert_eq!(failed_fields(&failures), vec!["title"]);
}

#[test]
fn derived_models_inherit_and_do_not_leak_back() {
    init_logging();
    let mut engine = ProfileEngine::new();
    engine.register_model(ModelDef::new("document"));
    engine.register_model(ModelDef::new("contract").parent("document"));

    engine
        .declare_profile("document", "soft")
        .define(|rules| {
            rules.rule("validates_presence_of", vec![Value::symbol("name")]);
        })
        .apply()
        .unwrap();
    engine.declare_profile("contract", "hard").apply().unwrap();

    // The derived model can switch to both its own and the inherited profile.
    assert!(engine.has_profile("contract", "soft"));
    assert!(engine.has_profile("contract", "hard"));

    // The ancestor never learns the derived model's profile.
    assert!(!engine.has_profile("document", "hard"));

    let contract = MemoryRecord::create(&engine, "contract").unwrap();
    engine.switch_to(&shared(&contract), "soft").unwrap();
    let failures = MemoryRecord::validate(&engine, &contract).unwrap();
    assert_eq!(failures.len(), 1);
}
