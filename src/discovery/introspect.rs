// Tue Jan 20 2026 - Alex

use crate::discovery::descriptor::JavaType;
use bitflags::bitflags;
use std::path::PathBuf;
use thiserror::Error;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

/// A method declared directly on a type, as reported by the provider.
/// Annotation names use the dotted binary form, e.g. `org.junit.Test`.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access: AccessFlags,
    pub name: String,
    pub param_types: Vec<JavaType>,
    pub return_type: JavaType,
    pub annotations: Vec<String>,
}

impl MethodInfo {
    pub fn is_accessible(&self) -> bool {
        self.access
            .intersects(AccessFlags::PUBLIC | AccessFlags::PROTECTED)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub binary_name: String,
    pub access: AccessFlags,
    /// Superclass chain, nearest first. May be truncated where a
    /// supertype is not present on the classpath.
    pub supertypes: Vec<String>,
    /// Methods declared directly on this type, not inherited ones.
    pub methods: Vec<MethodInfo>,
}

impl TypeDescriptor {
    pub fn is_abstract(&self) -> bool {
        self.access.contains(AccessFlags::ABSTRACT)
    }
}

#[derive(Error, Debug)]
pub enum IntrospectError {
    #[error("Class {0} not found on the classpath")]
    NotFound(String),
    #[error("Malformed class file {0}: {1}")]
    Malformed(PathBuf, String),
    #[error("Failed to read class file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Resolves a binary type name against a classpath. Discovery depends
/// only on this contract, never on a concrete loading mechanism.
pub trait IntrospectionProvider {
    fn resolve(
        &self,
        classpath: &[PathBuf],
        binary_name: &str,
    ) -> Result<TypeDescriptor, IntrospectError>;
}
