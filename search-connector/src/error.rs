use search_traits::{ErrorKind, TraitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no connector registered for type '{0}'")]
    UnknownType(String),

    #[error("connector type '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl From<RegistryError> for TraitError {
    fn from(e: RegistryError) -> Self {
        let kind = match &e {
            RegistryError::UnknownType(_) => ErrorKind::NotFound,
            RegistryError::AlreadyRegistered(_) => ErrorKind::AlreadyExists,
        };
        TraitError::new(kind, e.to_string())
    }
}
