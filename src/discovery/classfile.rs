// Wed Jan 21 2026 - Alex

use crate::discovery::descriptor::parse_method_descriptor;
use crate::discovery::introspect::{
    AccessFlags, IntrospectError, IntrospectionProvider, MethodInfo, TypeDescriptor,
};
use std::fs;
use std::path::{Path, PathBuf};

const MAGIC: u32 = 0xCAFE_BABE;
const MAX_SUPERTYPE_CHAIN: usize = 32;

/// Introspection provider backed by static class file parsing. Resolves
/// a binary type name by locating its `.class` file under the directory
/// entries of the classpath; archive entries are not inspected.
pub struct ClassfileIntrospector;

impl ClassfileIntrospector {
    pub fn new() -> Self {
        Self
    }

    fn locate(classpath: &[PathBuf], binary_name: &str) -> Option<PathBuf> {
        let relative = format!("{}.class", binary_name.replace('.', "/"));
        classpath
            .iter()
            .filter(|root| root.is_dir())
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    fn parse_at(path: &Path) -> Result<ParsedClass, IntrospectError> {
        let bytes = fs::read(path).map_err(|e| IntrospectError::Io(path.to_path_buf(), e))?;
        parse_class(&bytes).map_err(|msg| IntrospectError::Malformed(path.to_path_buf(), msg))
    }
}

impl Default for ClassfileIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionProvider for ClassfileIntrospector {
    fn resolve(
        &self,
        classpath: &[PathBuf],
        binary_name: &str,
    ) -> Result<TypeDescriptor, IntrospectError> {
        let path = Self::locate(classpath, binary_name)
            .ok_or_else(|| IntrospectError::NotFound(binary_name.to_string()))?;
        let parsed = Self::parse_at(&path)?;

        // Walk the superclass chain as far as the classpath reaches.
        let mut supertypes = Vec::new();
        let mut next = parsed.super_name.clone();
        while let Some(name) = next {
            supertypes.push(name.clone());
            if supertypes.len() >= MAX_SUPERTYPE_CHAIN {
                break;
            }
            next = match Self::locate(classpath, &name) {
                Some(super_path) => Self::parse_at(&super_path)
                    .map(|c| c.super_name)
                    .unwrap_or(None),
                None => None,
            };
        }

        Ok(TypeDescriptor {
            binary_name: parsed.binary_name,
            access: parsed.access,
            supertypes,
            methods: parsed.methods,
        })
    }
}

struct ParsedClass {
    binary_name: String,
    access: AccessFlags,
    super_name: Option<String>,
    methods: Vec<MethodInfo>,
}

enum Constant {
    Utf8(String),
    Class(u16),
    Other,
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| format!("truncated class file at offset {}", self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, String> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, String> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn parse_class(data: &[u8]) -> Result<ParsedClass, String> {
    let mut reader = Reader::new(data);

    if reader.u32()? != MAGIC {
        return Err("bad magic number".to_string());
    }
    let _minor = reader.u16()?;
    let _major = reader.u16()?;

    let pool = parse_constant_pool(&mut reader)?;

    let access = AccessFlags::from_bits_truncate(reader.u16()?);
    let this_class = reader.u16()?;
    let super_class = reader.u16()?;

    let binary_name = class_name(&pool, this_class)?;
    let super_name = if super_class == 0 {
        None
    } else {
        Some(class_name(&pool, super_class)?)
    };

    let interface_count = reader.u16()? as usize;
    reader.take(interface_count * 2)?;

    let field_count = reader.u16()? as usize;
    for _ in 0..field_count {
        skip_member(&mut reader)?;
    }

    let method_count = reader.u16()? as usize;
    let mut methods = Vec::with_capacity(method_count);
    for _ in 0..method_count {
        methods.push(read_method(&mut reader, &pool)?);
    }

    // Trailing class-level attributes carry nothing discovery needs.

    Ok(ParsedClass {
        binary_name,
        access,
        super_name,
        methods,
    })
}

fn parse_constant_pool(reader: &mut Reader) -> Result<Vec<Constant>, String> {
    let count = reader.u16()? as usize;
    let mut pool = Vec::with_capacity(count);
    pool.push(Constant::Other); // slot 0 is unused by the format

    let mut index = 1;
    while index < count {
        let tag = reader.u8()?;
        let entry = match tag {
            1 => {
                let length = reader.u16()? as usize;
                let bytes = reader.take(length)?;
                Constant::Utf8(String::from_utf8_lossy(bytes).into_owned())
            }
            7 => Constant::Class(reader.u16()?),
            3 | 4 => {
                reader.take(4)?;
                Constant::Other
            }
            5 | 6 => {
                reader.take(8)?;
                Constant::Other
            }
            8 | 16 | 19 | 20 => {
                reader.take(2)?;
                Constant::Other
            }
            9 | 10 | 11 | 12 | 17 | 18 => {
                reader.take(4)?;
                Constant::Other
            }
            15 => {
                reader.take(3)?;
                Constant::Other
            }
            other => return Err(format!("unknown constant pool tag {}", other)),
        };
        pool.push(entry);

        // Long and Double occupy two pool slots.
        if tag == 5 || tag == 6 {
            pool.push(Constant::Other);
            index += 2;
        } else {
            index += 1;
        }
    }

    Ok(pool)
}

fn skip_member(reader: &mut Reader) -> Result<(), String> {
    let _access = reader.u16()?;
    let _name = reader.u16()?;
    let _descriptor = reader.u16()?;
    let attribute_count = reader.u16()? as usize;
    for _ in 0..attribute_count {
        let _name = reader.u16()?;
        let length = reader.u32()? as usize;
        reader.take(length)?;
    }
    Ok(())
}

fn read_method(reader: &mut Reader, pool: &[Constant]) -> Result<MethodInfo, String> {
    let access = AccessFlags::from_bits_truncate(reader.u16()?);
    let name = utf8(pool, reader.u16()?)?.to_string();
    let descriptor = utf8(pool, reader.u16()?)?.to_string();

    let (param_types, return_type) = parse_method_descriptor(&descriptor)
        .ok_or_else(|| format!("malformed method descriptor {} on {}", descriptor, name))?;

    let mut annotations = Vec::new();
    let attribute_count = reader.u16()? as usize;
    for _ in 0..attribute_count {
        let attribute_name = utf8(pool, reader.u16()?)?;
        let length = reader.u32()? as usize;
        let body = reader.take(length)?;

        if attribute_name == "RuntimeVisibleAnnotations"
            || attribute_name == "RuntimeInvisibleAnnotations"
        {
            let mut body_reader = Reader::new(body);
            let annotation_count = body_reader.u16()?;
            for _ in 0..annotation_count {
                annotations.push(read_annotation(&mut body_reader, pool)?);
            }
        }
    }

    Ok(MethodInfo {
        access,
        name,
        param_types,
        return_type,
        annotations,
    })
}

fn read_annotation(reader: &mut Reader, pool: &[Constant]) -> Result<String, String> {
    let descriptor = utf8(pool, reader.u16()?)?.to_string();
    let pair_count = reader.u16()?;
    for _ in 0..pair_count {
        let _element_name = reader.u16()?;
        skip_element_value(reader, pool)?;
    }
    Ok(annotation_name(&descriptor))
}

fn skip_element_value(reader: &mut Reader, pool: &[Constant]) -> Result<(), String> {
    let tag = reader.u8()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            reader.u16()?;
        }
        b'e' => {
            reader.take(4)?;
        }
        b'@' => {
            read_annotation(reader, pool)?;
        }
        b'[' => {
            let count = reader.u16()?;
            for _ in 0..count {
                skip_element_value(reader, pool)?;
            }
        }
        other => return Err(format!("unknown element value tag {}", other)),
    }
    Ok(())
}

fn annotation_name(descriptor: &str) -> String {
    descriptor
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(|name| name.replace('/', "."))
        .unwrap_or_else(|| descriptor.to_string())
}

fn utf8(pool: &[Constant], index: u16) -> Result<&str, String> {
    match pool.get(index as usize) {
        Some(Constant::Utf8(value)) => Ok(value),
        _ => Err(format!("constant pool index {} is not a Utf8 entry", index)),
    }
}

fn class_name(pool: &[Constant], index: u16) -> Result<String, String> {
    match pool.get(index as usize) {
        Some(Constant::Class(name_index)) => Ok(utf8(pool, *name_index)?.replace('/', ".")),
        _ => Err(format!("constant pool index {} is not a Class entry", index)),
    }
}
