/// Build an error from a plain description.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Define a local `Context` trait for the calling module's `Error` and
/// `Result<T>`.
///
/// On `Result` the context is prefixed to the source error's text
/// (`"{context}: {source}"`). On `Option` the context alone becomes the error.
///
/// ```ignore
/// // crates/bus/src/error.rs
/// picker_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                let context = context.into();
                self.map_err(|source| $crate::context::prefixed::<Error>(&context, &source))
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|source| $crate::context::prefixed::<Error>(&f().into(), &source))
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(context.into()))
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}

#[doc(hidden)]
pub fn prefixed<E: FromMessage>(context: &str, source: &dyn std::fmt::Display) -> E {
    E::from_message(format!("{context}: {source}"))
}
