//! Shared fixtures for fx-core integration tests.

#![allow(dead_code)]

use fx_core::{Canvas, CanvasEvent, CanvasOptions, OBJECT_MODIFIED, ObjectId, Registry};
use std::cell::RefCell;
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn canvas_with(registry: Registry, options: CanvasOptions) -> Canvas {
    init_logging();
    Canvas::new(Rc::new(registry), options)
}

pub fn canvas() -> Canvas {
    canvas_with(Registry::new(), CanvasOptions::default())
}

/// Collects the targets of every `object:modified` notification.
pub fn modified_log(canvas: &mut Canvas) -> Rc<RefCell<Vec<ObjectId>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    canvas.on(OBJECT_MODIFIED, move |_, event: &CanvasEvent| {
        if let Some(target) = event.target {
            sink.borrow_mut().push(target);
        }
    });
    log
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
