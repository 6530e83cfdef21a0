// Tue Jan 20 2026 - Alex

pub mod classfile;
pub mod descriptor;
pub mod enumerator;
pub mod introspect;

pub use classfile::ClassfileIntrospector;
pub use descriptor::{encode_method_descriptor, parse_method_descriptor, JavaType, MethodDescriptor};
pub use enumerator::{DiscoveryError, MethodEnumerator};
pub use introspect::{
    AccessFlags, IntrospectError, IntrospectionProvider, MethodInfo, TypeDescriptor,
};
