//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Once;

use formula_expression::{NativeFunction, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

static TRACING: Once = Once::new();

/// Install a test subscriber; filter with `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A callable that counts its invocations and returns `result`
pub fn counting_function(name: &str, result: Value) -> (Value, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let func = NativeFunction::new(name, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(result.clone())
    });
    (func.into_value(), calls)
}
