use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn corrupt_data(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::CorruptData {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns true if this error reports malformed stored data.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self.kind(), ErrorKind::CorruptData { .. })
    }

    /// Returns true if this error reports a violated caller contract.
    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("corrupt data in '{element}': {message}")]
    CorruptData { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::corrupt_data("position list", "truncated header");
        assert!(err.is_corrupt_data());
        assert!(!err.is_invalid_arg());
        assert_eq!(
            err.to_string(),
            "corrupt data in 'position list': truncated header"
        );

        let err = Error::invalid_arg("positions", "must be strictly ascending");
        assert!(err.is_invalid_arg());
        assert!(matches!(err.into_kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = source.into();
        match err.into_kind() {
            ErrorKind::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            kind => panic!("unexpected error kind: {kind:?}"),
        }
    }
}
