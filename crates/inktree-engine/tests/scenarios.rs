//! Seed scenario tests against the public `Editor` surface (spec §8.3).

use inktree_engine::{Editor, Node, NodeKey, Point, Selection, UpdateOptions};

fn first_paragraph(editor: &Editor) -> NodeKey {
    editor.state().root().children()[0].clone()
}

#[test]
fn scenario_a_insert_into_empty_paragraph() {
    let mut editor = Editor::new();
    let paragraph = first_paragraph(&editor);

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::element(paragraph.clone(), 0), Point::element(paragraph.clone(), 0)));
            state.insert_text("Hi")
        })
        .unwrap();

    assert_eq!(editor.full_text(), "Hi\n");
    let root = editor.state().root();
    assert_eq!(root.children().len(), 1);
    let text_key = editor.state().get(&paragraph).unwrap().children()[0].clone();
    match editor.state().get(&text_key) {
        Some(Node::Text(t)) => assert_eq!(t.text, "Hi"),
        other => panic!("expected a text node, got {other:?}"),
    }
    match &editor.state().selection {
        Some(Selection::Range(r)) => {
            assert_eq!(r.anchor.key, text_key);
            assert_eq!(r.anchor.offset, 2);
        }
        other => panic!("expected a range selection, got {other:?}"),
    }
}

#[test]
fn scenario_b_split_paragraph_at_caret() {
    let mut editor = Editor::new();
    let paragraph = first_paragraph(&editor);

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::element(paragraph.clone(), 0), Point::element(paragraph.clone(), 0)));
            state.insert_text("HelloWorld")
        })
        .unwrap();

    let text_key = editor.state().get(&paragraph).unwrap().children()[0].clone();
    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::text(text_key.clone(), 5), Point::text(text_key.clone(), 5)));
            state.insert_paragraph()
        })
        .unwrap();

    assert_eq!(editor.full_text(), "Hello\nWorld\n");
    let root = editor.state().root();
    assert_eq!(root.children().len(), 2);

    let first_text_key = editor.state().get(&root.children()[0]).unwrap().children()[0].clone();
    let second_text_key = editor.state().get(&root.children()[1]).unwrap().children()[0].clone();
    match editor.state().get(&first_text_key) {
        Some(Node::Text(t)) => assert_eq!(t.text, "Hello"),
        other => panic!("unexpected node {other:?}"),
    }
    match editor.state().get(&second_text_key) {
        Some(Node::Text(t)) => assert_eq!(t.text, "World"),
        other => panic!("unexpected node {other:?}"),
    }
    match &editor.state().selection {
        Some(Selection::Range(r)) => {
            assert_eq!(r.focus.key, second_text_key);
            assert_eq!(r.focus.offset, 0);
        }
        other => panic!("expected a range selection, got {other:?}"),
    }
}

#[test]
fn scenario_c_bulk_paste() {
    let mut editor = Editor::new();
    let paragraph = first_paragraph(&editor);

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::element(paragraph.clone(), 0), Point::element(paragraph.clone(), 0)));
            Ok(())
        })
        .unwrap();

    let handled = editor.paste(None, Some("A\nB\nC"));
    assert!(handled);

    assert_eq!(editor.full_text(), "A\nB\nC\n");
    let root = editor.state().root();
    assert_eq!(root.children().len(), 3);

    // Caret lands on the last pasted paragraph's text, at its end.
    match &editor.state().selection {
        Some(Selection::Range(r)) => {
            assert_eq!(r.anchor.offset, 1);
            match editor.state().get(&r.anchor.key) {
                Some(Node::Text(t)) => assert_eq!(t.text, "C"),
                other => panic!("expected caret on pasted text C, got {other:?}"),
            }
        }
        other => panic!("expected a range selection, got {other:?}"),
    }
}

#[test]
fn scenario_d_delete_across_paragraph_boundary() {
    let mut editor = Editor::new();
    let first_paragraph = first_paragraph(&editor);

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(
                Point::element(first_paragraph.clone(), 0),
                Point::element(first_paragraph.clone(), 0),
            ));
            state.insert_text("abcdef")?;
            state.insert_paragraph()?;
            state.insert_text("ghijkl")
        })
        .unwrap();

    assert_eq!(editor.full_text(), "abcdef\nghijkl\n");
    let root = editor.state().root();
    assert_eq!(root.children().len(), 2);
    let second_paragraph = root.children()[1].clone();
    let second_text_key = editor.state().get(&second_paragraph).unwrap().children()[0].clone();

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::text(second_text_key.clone(), 0), Point::text(second_text_key, 0)));
            state.delete_character(true)
        })
        .unwrap();

    assert_eq!(editor.full_text(), "abcdefghijkl\n");
    let root = editor.state().root();
    assert_eq!(root.children().len(), 1);
    let merged_text_key = editor.state().get(&root.children()[0]).unwrap().children()[0].clone();
    match editor.state().get(&merged_text_key) {
        Some(Node::Text(t)) => assert_eq!(t.text, "abcdefghijkl"),
        other => panic!("expected one merged text node, got {other:?}"),
    }
    match &editor.state().selection {
        Some(Selection::Range(r)) => {
            assert_eq!(r.focus.key, merged_text_key);
            assert_eq!(r.focus.offset, 6);
        }
        other => panic!("expected a range selection, got {other:?}"),
    }
}

// Scenario E (inline decorator delete) lives in `src/update.rs`'s
// `#[cfg(test)]` module instead: building its initial tree needs direct
// `NodeMap` access, which is crate-internal rather than part of the
// public surface this file otherwise exercises.

#[test]
fn scenario_f_fenwick_lazy_shift_correctness() {
    let mut editor = Editor::new();

    editor
        .update(UpdateOptions::default(), |state| {
            let first = state.root().children()[0].clone();
            state.selection = Some(Selection::range(Point::element(first.clone(), 0), Point::element(first, 0)));
            state.insert_text("p0")?;
            for i in 1..1000 {
                state.insert_paragraph()?;
                state.insert_text(&format!("p{i}"))?;
            }
            Ok(())
        })
        .unwrap();

    let root_node = editor.state().root();
    assert_eq!(root_node.children().len(), 1000);

    // Snapshot the rendered location of every paragraph >= #4 before the edit.
    let paragraph4_plus: Vec<NodeKey> = root_node.children()[4..].to_vec();
    let before: Vec<usize> = paragraph4_plus
        .iter()
        .map(|p| {
            let text = editor.state().get(p).unwrap().children()[0].clone();
            editor.range_cache().actual_location(&text).unwrap()
        })
        .collect();

    let paragraph3 = editor.state().root().children()[3].clone();
    let text3 = editor.state().get(&paragraph3).unwrap().children()[0].clone();

    editor
        .update(UpdateOptions::default(), |state| {
            state.selection = Some(Selection::range(Point::text(text3.clone(), 2), Point::text(text3.clone(), 2)));
            state.insert_text("X")
        })
        .unwrap();

    let text3_after = editor.state().get(&paragraph3).unwrap().children()[0].clone();
    match editor.state().get(&text3_after) {
        Some(Node::Text(t)) => assert_eq!(t.text, "p3X"),
        other => panic!("expected the edited text node, got {other:?}"),
    }

    // Every paragraph at or after the edit point shifts its rendered
    // location by exactly +1 (one inserted character), while the others
    // before it are untouched.
    let after: Vec<usize> = paragraph4_plus
        .iter()
        .map(|p| {
            let text = editor.state().get(p).unwrap().children()[0].clone();
            editor.range_cache().actual_location(&text).unwrap()
        })
        .collect();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(*a, *b + 1);
    }
}
