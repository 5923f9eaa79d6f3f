use codemod_rules::{
    CustomRuleSpec, RuleContext, RuleRegistry, TransformPipeline, REACT_MIGRATE_MARKER,
};
use proptest::prelude::*;

fn next_ctx() -> RuleContext {
    RuleContext::new("next", "13.4.0", "14.0.0")
}

fn ctx() -> impl Strategy<Value = RuleContext> {
    prop::sample::select(vec![
        ("next", "13.4.0", "14.0.0"),
        ("react", "17.0.2", "18.2.0"),
        ("react-dom", "17.0.2", "18.2.0"),
        ("lodash", "4.17.0", "4.17.21"),
    ])
    .prop_map(|(pkg, current, target)| RuleContext::new(pkg, current, target))
}

fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "import { useRouter } from 'next/router';\n",
        "import {useRouter} from \"next/router\"\n",
        "import Router from 'next/router';\n",
        "import Image from 'next/legacy/image';\n",
        "ReactDOM.render(<App />, root);\n",
        "import React from 'react';\nReactDOM.render(<App />, document.getElementById('root'));\n",
        "module.exports = { experimental: {} };\n",
        "const x = 1;\n",
        "\n",
    ])
}

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..8).prop_map(|parts| parts.concat())
}

fn path() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["app/page.tsx", "next.config.js", "src/index.jsx"])
}

proptest! {
    #[test]
    fn prop_second_pass_is_a_noop(src in source(), path in path(), ctx in ctx()) {
        let registry = RuleRegistry::with_defaults();
        let pipeline = TransformPipeline::new(&registry);
        let first = pipeline.run(path, &src, &ctx);
        let second = pipeline.run(path, &first.content, &ctx);
        prop_assert_eq!(&second.content, &first.content);
        prop_assert_eq!(second.changes, 0);
    }

    #[test]
    fn prop_pipeline_is_deterministic(src in source(), path in path(), ctx in ctx()) {
        let registry = RuleRegistry::with_defaults();
        let pipeline = TransformPipeline::new(&registry);
        prop_assert_eq!(pipeline.run(path, &src, &ctx), pipeline.run(path, &src, &ctx));
    }

    #[test]
    fn prop_zero_changes_means_identical_content(src in source(), path in path(), ctx in ctx()) {
        let registry = RuleRegistry::with_defaults();
        let out = TransformPipeline::new(&registry).run(path, &src, &ctx);
        if out.changes == 0 {
            prop_assert_eq!(out.content, src);
        }
    }

    #[test]
    fn prop_react_note_is_added_once(src in source(), path in path()) {
        let registry = RuleRegistry::with_defaults();
        let pipeline = TransformPipeline::new(&registry);
        let ctx = RuleContext::new("react", "17.0.2", "18.2.0");
        let once = pipeline.run(path, &src, &ctx);
        let twice = pipeline.run(path, &once.content, &ctx);
        let expected = usize::from(src.contains("ReactDOM.render("));
        prop_assert_eq!(twice.content.matches(REACT_MIGRATE_MARKER).count(), expected);
        prop_assert!(!twice.content.contains("next/navigation"));
    }
}

#[test]
fn named_router_import_is_switched() {
    let registry = RuleRegistry::with_defaults();
    let out = TransformPipeline::new(&registry).run(
        "pages/index.tsx",
        "import { useRouter } from 'next/router';",
        &RuleContext::new("next", "13.4.0", "14.0.0"),
    );
    assert!(out.content.contains("import { useRouter } from 'next/navigation';"));
    assert_eq!(out.changes, 1);
}

#[test]
fn custom_rule_applies_once() {
    let mut registry = RuleRegistry::with_defaults();
    let spec = CustomRuleSpec::from_json(
        r#"{"name":"r1","pattern":"from 'lib/foo'","replacement":"from 'lib/bar'"}"#,
    )
    .unwrap();
    registry.register_custom(spec);

    let pipeline = TransformPipeline::new(&registry);
    let first = pipeline.run("a.ts", "import x from 'lib/foo';\n", &next_ctx());
    assert!(first.content.contains("from 'lib/bar'"));
    assert_eq!(first.changes, 1);

    let second = pipeline.run("a.ts", &first.content, &next_ctx());
    assert_eq!(second.changes, 0);
    assert_eq!(second.content, first.content);
}
