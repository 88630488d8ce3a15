// End-to-end insertion behaviour through a session: catalog lookup, loop
// detection, idempotent re-insertion and loop synthesis.

use proptest::prelude::*;
use stencil_common::{AttributeCatalog, AttributeDescriptor, AttributeKind, EditorConfig};
use stencil_editor_core::{
    ContainerKind, EditableDocument, EditorSession, InsertOutcome, Segment,
    TemplateInsertionEngine, find_loop_blocks,
};

const CHILD_DOC: &str = "Hello {% for Child in Child %}\n  {{ Child.Name }}\n{% endfor %} World";

fn session(text: &str) -> EditorSession {
    EditorSession::with_document(EditableDocument::from_text(text), EditorConfig::default())
}

fn catalog() -> AttributeCatalog {
    AttributeCatalog::new(vec![
        AttributeDescriptor::new("Age", AttributeKind::Numeric),
        AttributeDescriptor::new("Child", AttributeKind::Reference).with_nested(vec![
            AttributeDescriptor::new("Name", AttributeKind::Text),
            AttributeDescriptor::new("Born", AttributeKind::Date),
        ]),
    ])
    .unwrap()
}

#[test]
fn reinserting_existing_placeholder_relocates_cursor() {
    let mut s = session(CHILD_DOC);
    // Right after "{{ Child.Name }}".
    s.place_cursor(49);
    let engine = TemplateInsertionEngine::default();

    let outcome = engine.insert(&mut s, "Name", true, Some("Child"));

    assert_eq!(outcome, InsertOutcome::Relocated { cursor: 49 });
    assert_eq!(s.export_text(), CHILD_DOC);
    assert_eq!(s.export_text().matches("{{ Child.Name }}").count(), 1);
    assert_eq!(s.cursor_offset(), Some(49));
}

#[test]
fn reinsertion_ignores_case_and_spacing() {
    let text = "{% for Child in Child %}\n  {{child.NAME}}\n{% endfor %}";
    let mut s = session(text);
    s.place_cursor(30);
    let outcome = TemplateInsertionEngine::default().insert(&mut s, "Name", true, Some("Child"));
    assert_eq!(outcome, InsertOutcome::Relocated { cursor: 41 });
    assert_eq!(s.export_text(), text);
}

#[test]
fn empty_document_plain_attribute() {
    let mut s = EditorSession::default();
    TemplateInsertionEngine::default().insert(&mut s, "Age", false, None);
    assert_eq!(s.export_text(), "{{ Age }}");
    assert_eq!(s.cursor_offset(), Some(9));
}

#[test]
fn loop_synthesis_preserves_surrounding_text() {
    let mut s = session("before after");
    s.place_cursor(7);
    let outcome = TemplateInsertionEngine::default().insert(&mut s, "Name", true, Some("Child"));

    let InsertOutcome::NewLoop { range, cursor } = outcome else {
        panic!("expected a new loop, got {outcome:?}");
    };
    let text = s.export_text();
    assert!(text.starts_with("before "));
    assert!(text.ends_with("after"));
    assert_eq!(range.start, 7);
    assert_eq!(
        find_loop_blocks(&text, "Child").len(),
        1,
        "exactly one block: {text}"
    );
    assert_eq!(text.matches("{{ Child.Name }}").count(), 1);
    assert_eq!(s.cursor_offset(), Some(cursor));
    assert_eq!(&text[..cursor], "before {% for Child in Child %}\n  {{ Child.Name }}");
}

#[test]
fn second_nested_attribute_lands_in_synthesized_loop() {
    let cat = catalog();
    let mut s = EditorSession::default();
    let engine = TemplateInsertionEngine::for_session(&s);

    engine.insert_target(&mut s, &cat.resolve("Child.Name").unwrap());
    s.insert_text("\n  ");
    let outcome = engine.insert_target(&mut s, &cat.resolve("Child.Born").unwrap());
    assert!(matches!(outcome, InsertOutcome::InsideLoop { .. }));

    // Same attribute again: nothing new.
    let outcome = engine.insert_target(&mut s, &cat.resolve("Child.Name").unwrap());
    assert!(matches!(outcome, InsertOutcome::Relocated { .. }));

    insta::assert_snapshot!(s.export_text(), @r"
    {% for Child in Child %}
      {{ Child.Name }}
      {{ Child.Born }}
    {% endfor %}
    ");
}

#[test]
fn first_matching_block_wins() {
    let text = "{% for P in P %}{{ P.a }}{% endfor %}{% for P in P %}{% endfor %}";
    let config = EditorConfig {
        loop_tolerance: 20,
        ..EditorConfig::default()
    };
    let mut s = EditorSession::with_document(EditableDocument::from_text(text), config);
    // Between the blocks, inside the widened window of both.
    s.place_cursor(37);
    let outcome = TemplateInsertionEngine::for_session(&s).insert(&mut s, "a", true, Some("P"));
    assert_eq!(outcome, InsertOutcome::Relocated { cursor: 25 });
}

#[test]
fn insertion_inside_containers() {
    let doc = EditableDocument::from_segments(vec![
        Segment::container(ContainerKind::Heading(1), vec![Segment::text("Report")]),
        Segment::container(
            ContainerKind::UnorderedList,
            vec![Segment::container(
                ContainerKind::ListItem,
                vec![Segment::text("Age: ")],
            )],
        ),
    ]);
    let mut s = EditorSession::with_document(doc, EditorConfig::default());
    s.place_cursor(11);
    TemplateInsertionEngine::default().insert(&mut s, "Age", false, None);

    assert_eq!(s.export_text(), "ReportAge: {{ Age }}");
    let Some(Segment::Container(list)) = s.document().node(&[1]) else {
        panic!("list container lost");
    };
    assert_eq!(list.kind, ContainerKind::UnorderedList);
}

#[test]
fn unresolvable_names_are_rejected_by_catalog() {
    let cat = catalog();
    assert!(cat.resolve("Age.Name").is_err());
    assert!(cat.resolve("Child.Missing").is_err());
}

proptest! {
    #[test]
    fn prop_nested_insert_twice_is_idempotent(
        prefix in "[a-z \n]{0,20}",
        suffix in "[a-z \n]{0,20}",
    ) {
        let mut s = session(&format!("{prefix}{suffix}"));
        s.place_cursor(prefix.chars().count());
        let engine = TemplateInsertionEngine::default();

        engine.insert(&mut s, "Name", true, Some("Child"));
        let after_first = s.export_text();
        let outcome = engine.insert(&mut s, "Name", true, Some("Child"));

        prop_assert!(
            matches!(outcome, InsertOutcome::Relocated { cursor: _ }),
            "expected relocation, got {:?}",
            outcome
        );
        prop_assert_eq!(s.export_text(), after_first.clone());
        prop_assert_eq!(after_first.matches("{{ Child.Name }}").count(), 1);
        prop_assert!(after_first.starts_with(&prefix));
        prop_assert!(after_first.ends_with(&suffix));
    }

    #[test]
    fn prop_plain_insert_adds_one_placeholder(
        text in "[a-z \n]{0,30}",
        cursor in 0usize..40,
    ) {
        let mut s = session(&text);
        s.place_cursor(cursor);
        let at = cursor.min(text.chars().count());

        let outcome = TemplateInsertionEngine::default().insert(&mut s, "Age", false, None);

        prop_assert_eq!(outcome, InsertOutcome::Placeholder { range: at..at + 9 });
        prop_assert_eq!(s.export_text().matches("{{ Age }}").count(), 1);
        prop_assert_eq!(s.cursor_offset(), Some(at + 9));
    }
}
