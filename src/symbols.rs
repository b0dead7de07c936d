/* The extracted symbol model of a dex file */

use crate::dex::dex_file::{DexFile, FieldItem, MethodItem};
use crate::dex::error::DexError;
use crate::mapping::ApiMapping;
use crate::types::{Field, Member, Method, TypeDescriptor};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// The symbol model of a single dex file: the classes it defines and every
/// member it declares or references
///
/// `strings` and `types` are the raw constant pools in index order. A class
/// declared by the dex contributes to `classes`; each method/field id lands in
/// `declared_members` when its declaring type is one of `classes` and in
/// `referenced_members` otherwise. The two lists never share an entry.
///
/// The model is constructed once and not mutated afterwards; renaming via
/// [`Dex::with_mapping`] produces a new model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dex {
    pub strings: Vec<String>,
    pub types: Vec<String>,
    pub classes: Vec<TypeDescriptor>,
    pub declared_members: Vec<Member>,
    pub referenced_members: Vec<Member>,
}

impl Dex {

    /// Extracts the symbol model from a decoded dex structure.
    pub fn from_dex_file(dex: &DexFile) -> Result<Dex, DexError>
    {
        // Pools are copied verbatim in index order
        let strings: Vec<String> = dex.strings.iter().map(|s| s.to_string_lossy()).collect();
        let mut types = Vec::with_capacity(dex.types.len());
        for i in 0..dex.types.len() { types.push(dex.type_descriptor(i)?); }

        // Type indices named by a class_def are the declaration set; every
        // method/field id partitions on membership of its declaring type.
        let declared_type_indices: HashSet<usize> =
            dex.class_defs.iter().map(|c| c.class_idx).collect();

        let mut classes = Vec::with_capacity(dex.class_defs.len());
        for c in &dex.class_defs {
            classes.push(TypeDescriptor::from(dex.type_descriptor(c.class_idx)?));
        }

        let mut declared_methods = vec![];
        let mut referenced_methods = vec![];
        for method_id in &dex.methods {
            let method = Member::Method(resolve_method(dex, method_id)?);
            if declared_type_indices.contains(&method_id.class_idx) { declared_methods.push(method); }
            else { referenced_methods.push(method); }
        }

        let mut declared_fields = vec![];
        let mut referenced_fields = vec![];
        for field_id in &dex.fields {
            let field = Member::Field(resolve_field(dex, field_id)?);
            if declared_type_indices.contains(&field_id.class_idx) { declared_fields.push(field); }
            else { referenced_fields.push(field); }
        }

        // Methods precede fields in both groups, each in id-table order
        let mut declared_members = declared_methods;
        declared_members.extend(declared_fields);
        let mut referenced_members = referenced_methods;
        referenced_members.extend(referenced_fields);

        debug!("extracted {} classes, {} declared members, {} referenced members",
               classes.len(), declared_members.len(), referenced_members.len());

        Ok(Dex { strings, types, classes, declared_members, referenced_members })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Dex, DexError>
    {
        let dex_file = DexFile::from_bytes(bytes)?;
        Dex::from_dex_file(&dex_file)
    }

    pub fn from_file(path: &Path) -> Result<Dex, DexError>
    {
        let dex_file = DexFile::from_file(path)?;
        Dex::from_dex_file(&dex_file)
    }

    /// All members, declared first then referenced.
    pub fn members(&self) -> impl Iterator<Item = &Member>
    {
        self.declared_members.iter().chain(self.referenced_members.iter())
    }

    /// Returns the model with classes and members renamed through `mapping`.
    ///
    /// An empty mapping returns the model unchanged. Otherwise every entry of
    /// `classes`, `declared_members` and `referenced_members` is mapped
    /// element-wise; order and the declared/referenced split are preserved.
    /// The raw `strings` and `types` pools are left unmapped.
    pub fn with_mapping(self, mapping: &ApiMapping) -> Dex
    {
        if mapping.is_empty() { return self; }

        let classes = self.classes.iter().map(|c| mapping.get_type(c)).collect();
        let declared_members = self.declared_members.iter().map(|m| mapping.get_member(m)).collect();
        let referenced_members = self.referenced_members.iter().map(|m| mapping.get_member(m)).collect();
        Dex {
            strings: self.strings,
            types: self.types,
            classes,
            declared_members,
            referenced_members,
        }
    }
}

fn resolve_method(dex: &DexFile, method_id: &MethodItem) -> Result<Method, DexError>
{
    let declaring_type = TypeDescriptor::from(dex.type_descriptor(method_id.class_idx)?);
    let name = dex.get_string(method_id.name_idx)?;
    let prototype = &dex.prototypes[method_id.proto_idx];
    let mut parameter_types = Vec::with_capacity(prototype.parameters.0.len());
    for t in &prototype.parameters.0 {
        parameter_types.push(TypeDescriptor::from(dex.type_descriptor(*t)?));
    }
    let return_type = TypeDescriptor::from(dex.type_descriptor(prototype.return_type_idx)?);
    Ok(Method { declaring_type, name, parameter_types, return_type })
}

fn resolve_field(dex: &DexFile, field_id: &FieldItem) -> Result<Field, DexError>
{
    Ok(Field {
        declaring_type: TypeDescriptor::from(dex.type_descriptor(field_id.class_idx)?),
        name: dex.get_string(field_id.name_idx)?,
        field_type: TypeDescriptor::from(dex.type_descriptor(field_id.type_idx)?),
    })
}
