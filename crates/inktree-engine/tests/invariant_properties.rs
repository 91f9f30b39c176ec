//! Property tests for spec §8.1 invariants I1-I8, driven through the public
//! `Editor` surface with randomized operation sequences.

use proptest::prelude::*;

use inktree_engine::{Editor, Node, Point, Selection, UpdateOptions};

#[derive(Clone, Debug)]
enum Op {
    InsertText(String),
    InsertParagraph,
    DeleteBackward,
    DeleteForward,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-zA-Z]{1,4}".prop_map(Op::InsertText),
        Just(Op::InsertParagraph),
        Just(Op::DeleteBackward),
        Just(Op::DeleteForward),
    ]
}

fn apply_op(editor: &mut Editor, op: &Op) {
    // Always caret at the end of the document's last text-bearing node
    // (or the root's first child) before applying the op, so every op has
    // a valid collapsed selection to act on regardless of what came before.
    let _ = editor.update(UpdateOptions::default(), |state| {
        let last_block = state.root().children().last().cloned();
        match last_block {
            Some(block) => {
                let text_child = state.get(&block).and_then(|n| n.children().last().cloned());
                match text_child {
                    Some(child) if matches!(state.get(&child), Some(Node::Text(_))) => {
                        let len = state.get(&child).map(|n| n.own_text_length()).unwrap_or(0);
                        state.selection = Some(Selection::range(Point::text(child.clone(), len), Point::text(child, len)));
                    }
                    _ => {
                        let count = state.get(&block).map(|n| n.children().len()).unwrap_or(0);
                        state.selection = Some(Selection::range(Point::element(block.clone(), count), Point::element(block, count)));
                    }
                }
                Ok(())
            }
            None => Ok(()),
        }
    });

    let _ = editor.update(UpdateOptions::default(), |state| match op {
        Op::InsertText(s) => state.insert_text(s),
        Op::InsertParagraph => state.insert_paragraph(),
        Op::DeleteBackward => state.delete_character(true),
        Op::DeleteForward => state.delete_character(false),
    });
}

proptest! {
    /// I4: after every commit, every selection-referenced key exists and
    /// every text point's offset is within bounds. I1/I2-adjacent: the tree
    /// stays well-formed (no dangling parent/child references) throughout.
    /// Also exercises I8 indirectly: `sanity_check` defaults to on, so a
    /// reconcile that diverged from a full rebuild would already have
    /// failed the `update()` call above before we get here.
    #[test]
    fn random_edit_sequences_preserve_invariants(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut editor = Editor::new();
        for op in &ops {
            apply_op(&mut editor, op);
            prop_assert!(editor.state().check_invariants().is_ok());
        }
    }

    /// I7: committing with an empty closure (no dirty nodes) leaves the
    /// model's text content and node count unchanged.
    #[test]
    fn idempotent_commit_leaves_state_unchanged(ops in prop::collection::vec(op_strategy(), 0..10)) {
        let mut editor = Editor::new();
        for op in &ops {
            apply_op(&mut editor, op);
        }
        let text_before = editor.state().text_content(&inktree_engine::NodeKey::root());
        let count_before = editor.state().node_count();

        editor.update(UpdateOptions::default(), |_state| Ok(())).unwrap();

        let text_after = editor.state().text_content(&inktree_engine::NodeKey::root());
        let count_after = editor.state().node_count();
        prop_assert_eq!(text_before, text_after);
        prop_assert_eq!(count_before, count_after);
    }
}
