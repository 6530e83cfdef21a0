// Tue Jan 20 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a discovered test method. Unique per
/// (class_name, method_name, method_descriptor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub method_name: String,
    pub method_descriptor: String,
    pub class_name: String,
}

impl MethodDescriptor {
    pub fn new(method_name: &str, method_descriptor: &str, class_name: &str) -> Self {
        Self {
            method_name: method_name.to_string(),
            method_descriptor: method_descriptor.to_string(),
            class_name: class_name.to_string(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }

    /// Class name in the path-style form the analysis engine expects.
    pub fn class_path_form(&self) -> String {
        self.class_name.replace('.', "/")
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}:{}",
            self.class_name, self.method_name, self.method_descriptor
        )
    }
}

/// A JVM type as reported by the introspection provider. Reference and
/// array names use the dotted binary form, descriptors use `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
    Array(String),
    Reference(String),
}

impl JavaType {
    pub fn descriptor_code(&self) -> String {
        match self {
            JavaType::Byte => "B".to_string(),
            JavaType::Char => "C".to_string(),
            JavaType::Double => "D".to_string(),
            JavaType::Float => "F".to_string(),
            JavaType::Int => "I".to_string(),
            JavaType::Long => "J".to_string(),
            JavaType::Short => "S".to_string(),
            JavaType::Boolean => "Z".to_string(),
            JavaType::Void => "V".to_string(),
            JavaType::Array(name) => name.replace('.', "/"),
            JavaType::Reference(name) => format!("L{};", name).replace('.', "/"),
        }
    }
}

/// Canonical encoded signature: parameter codes inside parentheses
/// followed by the return code, e.g. `(ILjava/lang/String;)Z`.
pub fn encode_method_descriptor(params: &[JavaType], ret: &JavaType) -> String {
    let mut encoded = String::from("(");
    for param in params {
        encoded.push_str(&param.descriptor_code());
    }
    encoded.push(')');
    encoded.push_str(&ret.descriptor_code());
    encoded
}

/// Parses an encoded method descriptor back into parameter and return
/// types. Returns None on malformed input.
pub fn parse_method_descriptor(descriptor: &str) -> Option<(Vec<JavaType>, JavaType)> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }

    let mut params = Vec::new();
    let mut pos = 1;
    while pos < bytes.len() && bytes[pos] != b')' {
        let (param, next) = parse_field_type(descriptor, pos)?;
        params.push(param);
        pos = next;
    }
    if pos >= bytes.len() {
        return None;
    }

    let (ret, end) = parse_field_type(descriptor, pos + 1)?;
    if end != descriptor.len() {
        return None;
    }

    Some((params, ret))
}

fn parse_field_type(descriptor: &str, start: usize) -> Option<(JavaType, usize)> {
    let bytes = descriptor.as_bytes();
    match *bytes.get(start)? {
        b'B' => Some((JavaType::Byte, start + 1)),
        b'C' => Some((JavaType::Char, start + 1)),
        b'D' => Some((JavaType::Double, start + 1)),
        b'F' => Some((JavaType::Float, start + 1)),
        b'I' => Some((JavaType::Int, start + 1)),
        b'J' => Some((JavaType::Long, start + 1)),
        b'S' => Some((JavaType::Short, start + 1)),
        b'Z' => Some((JavaType::Boolean, start + 1)),
        b'V' => Some((JavaType::Void, start + 1)),
        b'L' => {
            let end = descriptor[start..].find(';')? + start;
            let name = descriptor[start + 1..end].replace('/', ".");
            Some((JavaType::Reference(name), end + 1))
        }
        b'[' => {
            let (_, end) = parse_field_type(descriptor, start + 1)?;
            let name = descriptor[start..end].replace('/', ".");
            Some((JavaType::Array(name), end))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_int_string_to_boolean() {
        let encoded = encode_method_descriptor(
            &[
                JavaType::Int,
                JavaType::Reference("java.lang.String".to_string()),
            ],
            &JavaType::Boolean,
        );
        assert_eq!(encoded, "(ILjava/lang/String;)Z");
    }

    #[test]
    fn test_encode_primitives_only() {
        let encoded = encode_method_descriptor(
            &[JavaType::Byte, JavaType::Char, JavaType::Double, JavaType::Float],
            &JavaType::Void,
        );
        assert_eq!(encoded, "(BCDF)V");

        let encoded = encode_method_descriptor(
            &[JavaType::Long, JavaType::Short, JavaType::Boolean],
            &JavaType::Int,
        );
        assert_eq!(encoded, "(JSZ)I");
    }

    #[test]
    fn test_encode_array_types() {
        let encoded = encode_method_descriptor(
            &[
                JavaType::Array("[I".to_string()),
                JavaType::Array("[Ljava.lang.String;".to_string()),
            ],
            &JavaType::Void,
        );
        assert_eq!(encoded, "([I[Ljava/lang/String;)V");
    }

    #[test]
    fn test_parse_round_trip() {
        let (params, ret) = parse_method_descriptor("(ILjava/lang/String;)Z").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], JavaType::Int);
        assert_eq!(
            params[1],
            JavaType::Reference("java.lang.String".to_string())
        );
        assert_eq!(ret, JavaType::Boolean);
        assert_eq!(encode_method_descriptor(&params, &ret), "(ILjava/lang/String;)Z");
    }

    #[test]
    fn test_parse_nested_array() {
        let (params, ret) = parse_method_descriptor("([[J)V").unwrap();
        assert_eq!(params, vec![JavaType::Array("[[J".to_string())]);
        assert_eq!(ret, JavaType::Void);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_method_descriptor("").is_none());
        assert!(parse_method_descriptor("I)V").is_none());
        assert!(parse_method_descriptor("(I").is_none());
        assert!(parse_method_descriptor("(Q)V").is_none());
        assert!(parse_method_descriptor("(Ljava/lang/String)V").is_none());
        assert!(parse_method_descriptor("(I)VV").is_none());
    }

    #[test]
    fn test_display() {
        let method = MethodDescriptor::new("testFoo", "()V", "com.example.FooTest");
        assert_eq!(method.to_string(), "com.example.FooTest.testFoo:()V");
        assert_eq!(method.class_path_form(), "com/example/FooTest");
    }
}
