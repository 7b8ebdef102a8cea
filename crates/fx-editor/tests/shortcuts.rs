//! Integration tests: key events through the editor to canvas commands.

mod common;

use common::editor;
use fx_core::{CanvasObject, OBJECT_MODIFIED, ObjectKind};
use fx_editor::KeyEvent;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn ctrl_g_runs_once_only_while_focused() {
    let mut editor = editor();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    editor
        .shortcuts_mut()
        .register("ctrl+g", move |_, _| counter.set(counter.get() + 1))
        .unwrap();

    let mut event = KeyEvent::new("g").ctrl();
    assert!(editor.handle_key_down(&mut event));
    assert_eq!(calls.get(), 1);
    assert!(event.default_prevented());

    editor.canvas_mut().set_focused(false);
    let mut event = KeyEvent::new("g").ctrl();
    assert!(!editor.handle_key_down(&mut event));
    assert_eq!(calls.get(), 1);
    assert!(!event.default_prevented());
}

#[test]
fn cmd_is_ctrl() {
    let mut editor = editor();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    editor
        .shortcuts_mut()
        .register("Shift + CTRL + a", move |_, _| counter.set(counter.get() + 1))
        .unwrap();
    editor.handle_key_down(&mut KeyEvent::new("A").meta().shift());
    editor.handle_key_down(&mut KeyEvent::new("a").ctrl().shift());
    assert_eq!(calls.get(), 2);
}

#[test]
fn ctrl_g_groups_then_ungroups() {
    let mut editor = editor();
    let canvas = editor.canvas_mut();
    let a = canvas.add(CanvasObject::rect(10.0, 10.0).at(0.0, 0.0)).unwrap();
    let b = canvas.add(CanvasObject::ellipse(10.0, 10.0).at(20.0, 20.0)).unwrap();
    canvas.set_active_objects(vec![a, b]).unwrap();

    editor.handle_key_down(&mut KeyEvent::new("g").ctrl());
    let group = editor.canvas().active_objects()[0];
    assert_eq!(editor.canvas().object(group).unwrap().kind, ObjectKind::Group);
    assert_eq!(editor.canvas().objects(), vec![group]);
    assert_eq!(editor.canvas().children_of(group), vec![a, b]);

    editor.handle_key_down(&mut KeyEvent::new("g").ctrl());
    assert_eq!(editor.canvas().objects(), vec![a, b]);
    assert_eq!(editor.canvas().active_objects(), &[a, b]);
    let b_obj = editor.canvas().object(b).unwrap();
    assert!((b_obj.left - 20.0).abs() < 1e-9 && (b_obj.top - 20.0).abs() < 1e-9);
}

#[test]
fn nudging_fires_modified() {
    let mut editor = editor();
    let canvas = editor.canvas_mut();
    let id = canvas.add(CanvasObject::rect(10.0, 10.0)).unwrap();
    canvas.set_active_objects(vec![id]).unwrap();
    let modified = Rc::new(Cell::new(0));
    let counter = Rc::clone(&modified);
    canvas.on(OBJECT_MODIFIED, move |_, _| counter.set(counter.get() + 1));

    editor.handle_key_down(&mut KeyEvent::new("ArrowRight").shift());
    assert_eq!(modified.get(), 1);
    assert_eq!(editor.canvas().object(id).unwrap().left, 10.0);
}

#[test]
fn delete_removes_the_selection() {
    let mut editor = editor();
    let canvas = editor.canvas_mut();
    let a = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
    let b = canvas.add(CanvasObject::rect(1.0, 1.0)).unwrap();
    canvas.set_active_objects(vec![a, b]).unwrap();

    let mut event = KeyEvent::new("Delete");
    assert!(editor.handle_key_down(&mut event));
    assert!(editor.canvas().objects().is_empty());
    assert!(editor.canvas().active_objects().is_empty());
}
