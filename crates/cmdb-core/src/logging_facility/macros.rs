//! Operation logging macros
//!
//! A render, reverse-reference lookup or clear emits one `start` event and
//! exactly one terminal event, `end` or `end_error`, carrying `duration_ms`.
//! `component` is the module the macro is expanded in. Extra `key = value`
//! pairs are passed to `tracing` unchanged.

/// Shared body of the `log_op_*` macros
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:expr, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        $crate::__private::tracing::event!(
            $level,
            component = module_path!(),
            op = $op,
            event = $crate::__private::schema::$event,
            $($($field)*)?
        )
    };
}

/// Emit the `start` event of an operation
///
/// ```
/// # use cmdb_core::log_op_start;
/// log_op_start!("render_object");
/// log_op_start!("render_object", object_id = 100, depth = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {{
        $crate::__log_op_event!(
            $crate::__private::tracing::Level::INFO,
            $op,
            EVENT_START,
            $($($field)*)?
        );
    }};
}

/// Emit the `end` event of a successful operation
///
/// ```
/// # use cmdb_core::log_op_end;
/// log_op_end!("find_referencing", duration_ms = 3);
/// log_op_end!("find_referencing", duration_ms = 3, total = 7);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        $crate::__log_op_event!(
            $crate::__private::tracing::Level::INFO,
            $op,
            EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    }};
}

/// Emit the `end_error` event of a failed operation
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError);
/// its kind and stable code are logged as `err_kind` and `err_code`.
///
/// ```
/// # use cmdb_core::{log_op_error, errors::CmdbError};
/// let err = CmdbError::ObjectNotFound { object_id: 404 };
/// log_op_error!("clear_references", err, duration_ms = 1, object_id = 404);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            $crate::__private::tracing::Level::ERROR,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)*)?
        );
    }};
}
