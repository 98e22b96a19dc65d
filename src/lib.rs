// qdebug - lib.rs
//
// Quick debug printing to a side log file: `q!(a, b.c, x + 1)` appends
//
//   [14:00:36 main.rs:12 demo::main]
//   0.000s a=1 b.c="two" x + 1=3
//
// to `<temp dir>/q`, away from the program's own stdout and stderr.
// Watch it with `tail -f $TMPDIR/q` or `qtail -f`.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;

pub use crate::app::logger::Logger;
pub use crate::core::model::CallSite;
pub use crate::platform::config::LoggerConfig;

/// Path of the function this macro is expanded in, e.g. `demo::main`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::core::model::trim_function_name(type_name_of(__f))
    }};
}

/// The [`CallSite`] of the macro invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::core::model::CallSite {
            file: ::std::file!(),
            line: ::std::line!(),
            function: $crate::function_name!(),
            manifest_dir: ::std::option_env!("CARGO_MANIFEST_DIR"),
        }
    };
}

/// Pretty-print the arguments, with their source text, to the q log file.
///
/// ```no_run
/// let retries = 3;
/// let hosts = vec!["a", "b"];
/// qdebug::q!(retries, hosts.len(), "checkpoint");
/// ```
///
/// Never writes to stdout or stderr, and only panics if an argument's
/// `Debug` impl does. A `Debug` impl returning an error prints as
/// `<Debug error>`. Any argument implementing `Debug` is accepted; values
/// are only borrowed.
#[macro_export]
macro_rules! q {
    ($($arg:expr),* $(,)?) => {
        $crate::app::logger::Logger::global().log(
            &$crate::call_site!(),
            &[$(&$arg as &dyn ::std::fmt::Debug),*],
        )
    };
}
