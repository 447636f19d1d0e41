//! `define_port_error!`: declares a port error enum with `thiserror` messages
//! and a snake_case constructor per variant.
//!
//! ```text
//! define_port_error! {
//!     pub enum MailerError {
//!         Rejected { message: String } => "mail relay rejected message: {message}",
//!     }
//! }
//! // MailerError::rejected("550 no such user")
//! ```
//!
//! Constructor parameters take `impl Into<FieldType>` so callers can pass
//! `&str` where the variant stores a `String`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = "Construct the `" $variant "` variant."]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SampleAdapterError {
            Offline => "adapter offline",
            Rejected { message: String } => "rejected: {message}",
            Throttled { message: String, retry_after_secs: u64 } =>
                "throttled: {message} (retry in {retry_after_secs}s)",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SampleAdapterError::offline().to_string(), "adapter offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SampleAdapterError::rejected("550 mailbox unavailable");
        assert_eq!(err.to_string(), "rejected: 550 mailbox unavailable");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SampleAdapterError::throttled("slow down", 30_u64);
        assert_eq!(
            err,
            SampleAdapterError::Throttled {
                message: "slow down".to_owned(),
                retry_after_secs: 30,
            }
        );
    }
}
