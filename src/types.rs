/* Value types for the extracted symbol model */
/* Types are stored in the dex native (also JNI) descriptor format e.g. Ljava/lang/Object; */

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::char;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a dex type descriptor, the fully qualified binary name of a type
///
/// Equality, hashing and ordering are by descriptor.
///
/// # Examples
///
/// ```
///  use dexsym::types::TypeDescriptor;
///
///  let t = TypeDescriptor::new("Lcom/basic/Test;");
///  assert_eq!(t.source_name(), "com.basic.Test");
///  let a = TypeDescriptor::new("[[I");
///  assert_eq!(a.array_arity(), 2);
///  assert_eq!(a.source_name(), "int[][]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    descriptor: String,
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(descriptor: &str) -> TypeDescriptor {
        TypeDescriptor::new(descriptor)
    }
}

impl From<String> for TypeDescriptor {
    fn from(descriptor: String) -> TypeDescriptor {
        TypeDescriptor { descriptor }
    }
}

impl TypeDescriptor {
    pub fn new(descriptor: &str) -> TypeDescriptor {
        TypeDescriptor { descriptor: descriptor.to_string() }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Number of array dimensions, e.g. 2 for `[[I`
    pub fn array_arity(&self) -> usize {
        self.descriptor.bytes().take_while(|b| *b == b'[').count()
    }

    /// The descriptor with any array dimensions stripped
    pub fn component_descriptor(&self) -> &str {
        &self.descriptor[self.array_arity()..]
    }

    pub fn component_type(&self) -> TypeDescriptor {
        TypeDescriptor::new(self.component_descriptor())
    }

    /// Re-applies array dimensions to the component descriptor
    pub fn with_array_arity(&self, arity: usize) -> TypeDescriptor {
        let mut descriptor = "[".repeat(arity);
        descriptor.push_str(self.component_descriptor());
        TypeDescriptor { descriptor }
    }

    /// The Java source rendering of the descriptor, e.g. `com.basic.Test` or `int[]`
    ///
    /// An unparseable descriptor is returned verbatim.
    pub fn source_name(&self) -> String {
        match parse_descriptor(&self.descriptor) {
            Ok(("", d)) => d.to_source(),
            _ => self.descriptor.clone(),
        }
    }
}

/* Parsed form of a dex type descriptor. Dex type_ids never carry generic
   signatures so the grammar stops at arrays, objects and primitives. */
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Descriptor {
    Array(Box<Descriptor>),
    Object(String),
    Int,
    Bool,
    Byte,
    Char,
    Short,
    Long,
    Float,
    Double,
    Void,
}

impl Descriptor {
    pub fn to_source(&self) -> String {
        match self {
            Descriptor::Array(a) => format!("{}[]", a.to_source()),
            Descriptor::Object(o) => o.replace('/', "."),
            Descriptor::Bool => "boolean".to_string(),
            Descriptor::Byte => "byte".to_string(),
            Descriptor::Char => "char".to_string(),
            Descriptor::Short => "short".to_string(),
            Descriptor::Int => "int".to_string(),
            Descriptor::Long => "long".to_string(),
            Descriptor::Float => "float".to_string(),
            Descriptor::Double => "double".to_string(),
            Descriptor::Void => "void".to_string(),
        }
    }
}

pub(crate) fn parse_descriptor(descriptor: &str) -> IResult<&str, Descriptor> {
    // Object
    let l: IResult<&str, &str> = tag("L").parse(descriptor);
    if let Ok((o, _)) = l {
        let (o, t) = take_while(|x| x != ';')(o)?;
        let (o, _) = char(';')(o)?;
        return Ok((o, Descriptor::Object(t.to_string())));
    }

    // Array
    let b: IResult<&str, &str> = tag("[").parse(descriptor);
    if let Ok((o, _)) = b {
        let (o, t) = parse_descriptor(o)?;
        return Ok((o, Descriptor::Array(Box::new(t))));
    }

    // Primitive Type
    let (o, t) = alt((
        tag("Z"),
        tag("B"),
        tag("C"),
        tag("S"),
        tag("I"),
        tag("J"),
        tag("F"),
        tag("D"),
        tag("V"),
    ))
        .parse(descriptor)?;
    let d = match t {
        "Z" => Descriptor::Bool,
        "B" => Descriptor::Byte,
        "C" => Descriptor::Char,
        "S" => Descriptor::Short,
        "I" => Descriptor::Int,
        "J" => Descriptor::Long,
        "F" => Descriptor::Float,
        "D" => Descriptor::Double,
        _ => Descriptor::Void,
    };
    Ok((o, d))
}

/// A method symbol: declaring type, name, parameter types and return type
///
/// # Examples
///
/// ```
///  use dexsym::types::{Method, TypeDescriptor};
///
///  let m = Method {
///      declaring_type: TypeDescriptor::new("Lapp/Foo;"),
///      name: "bar".to_string(),
///      parameter_types: vec![TypeDescriptor::new("I")],
///      return_type: TypeDescriptor::new("V"),
///  };
///  assert_eq!(m.to_string(), "Lapp/Foo;->bar(I)V");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Method {
    pub declaring_type: TypeDescriptor,
    pub name: String,
    pub parameter_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}(", self.declaring_type, self.name)?;
        for t in &self.parameter_types {
            write!(f, "{}", t)?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// A field symbol: declaring type, name and field type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Field {
    pub declaring_type: TypeDescriptor,
    pub name: String,
    pub field_type: TypeDescriptor,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}:{}", self.declaring_type, self.name, self.field_type)
    }
}

/// A member symbol, either a method or a field
///
/// Callers match on the variant rather than downcasting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Member {
    Method(Method),
    Field(Field),
}

impl Member {
    pub fn declaring_type(&self) -> &TypeDescriptor {
        match self {
            Member::Method(m) => &m.declaring_type,
            Member::Field(f) => &f.declaring_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Method(m) => &m.name,
            Member::Field(f) => &f.name,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Member::Method(m) => m.fmt(f),
            Member::Field(fi) => fi.fmt(f),
        }
    }
}

impl From<Method> for Member {
    fn from(m: Method) -> Member {
        Member::Method(m)
    }
}

impl From<Field> for Member {
    fn from(f: Field) -> Member {
        Member::Field(f)
    }
}
