/* Rename mapping used to undo identifier obfuscation before comparison */

use crate::types::{Field, Member, Method, TypeDescriptor};
use std::collections::HashMap;

/// A rename mapping from obfuscated symbols to their original names
///
/// Lookups are a partial function defaulting to identity: a symbol with no
/// rule passes through unchanged. Rules are keyed by symbols as they appear
/// in the un-remapped model, member rules by their full signature so that
/// overloaded names resolve independently.
///
/// # Examples
///
/// ```
///  use dexsym::mapping::ApiMapping;
///  use dexsym::types::TypeDescriptor;
///
///  let mut mapping = ApiMapping::new();
///  mapping.add_type(TypeDescriptor::new("La/a;"), TypeDescriptor::new("Lcom/basic/Test;"));
///
///  assert_eq!(mapping.get_type(&TypeDescriptor::new("La/a;")).descriptor(), "Lcom/basic/Test;");
///  assert_eq!(mapping.get_type(&TypeDescriptor::new("[La/a;")).descriptor(), "[Lcom/basic/Test;");
///  assert_eq!(mapping.get_type(&TypeDescriptor::new("La/b;")).descriptor(), "La/b;");
/// ```
#[derive(Debug, Default)]
pub struct ApiMapping {
    type_mappings: HashMap<String, TypeMapping>,
}

#[derive(Debug)]
struct TypeMapping {
    new_type: TypeDescriptor,
    methods: HashMap<MethodSignature, String>,
    fields: HashMap<FieldSignature, String>,
}

impl TypeMapping {
    fn identity(descriptor: &str) -> TypeMapping {
        TypeMapping {
            new_type: TypeDescriptor::new(descriptor),
            methods: HashMap::new(),
            fields: HashMap::new(),
        }
    }
}

/* Member rules are keyed by the full signature, not the simple name */
#[derive(Debug, PartialEq, Eq, Hash)]
struct MethodSignature {
    name: String,
    parameter_types: Vec<String>,
    return_type: String,
}

impl MethodSignature {
    fn of(method: &Method) -> MethodSignature {
        MethodSignature {
            name: method.name.clone(),
            parameter_types: method.parameter_types.iter().map(|t| t.descriptor().to_string()).collect(),
            return_type: method.return_type.descriptor().to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct FieldSignature {
    name: String,
    field_type: String,
}

impl FieldSignature {
    fn of(field: &Field) -> FieldSignature {
        FieldSignature {
            name: field.name.clone(),
            field_type: field.field_type.descriptor().to_string(),
        }
    }
}

impl ApiMapping {
    pub fn new() -> ApiMapping {
        ApiMapping::default()
    }

    pub fn is_empty(&self) -> bool {
        self.type_mappings.is_empty()
    }

    /// Adds a class rename rule. `from` and `to` are component descriptors.
    pub fn add_type(&mut self, from: TypeDescriptor, to: TypeDescriptor) {
        let entry = self
            .type_mappings
            .entry(from.descriptor().to_string())
            .or_insert_with(|| TypeMapping::identity(from.descriptor()));
        entry.new_type = to;
    }

    /// Adds a method rename rule: the method's signature maps to a new simple name.
    pub fn add_method(&mut self, method: &Method, new_name: &str) {
        let key = method.declaring_type.component_descriptor().to_string();
        let entry = self
            .type_mappings
            .entry(key)
            .or_insert_with(|| TypeMapping::identity(method.declaring_type.component_descriptor()));
        entry.methods.insert(MethodSignature::of(method), new_name.to_string());
    }

    /// Adds a field rename rule: the field's signature maps to a new simple name.
    pub fn add_field(&mut self, field: &Field, new_name: &str) {
        let key = field.declaring_type.component_descriptor().to_string();
        let entry = self
            .type_mappings
            .entry(key)
            .or_insert_with(|| TypeMapping::identity(field.declaring_type.component_descriptor()));
        entry.fields.insert(FieldSignature::of(field), new_name.to_string());
    }

    /// Maps a type through the rename rules, preserving array arity.
    pub fn get_type(&self, t: &TypeDescriptor) -> TypeDescriptor {
        match self.type_mappings.get(t.component_descriptor()) {
            Some(m) => m.new_type.with_array_arity(t.array_arity()),
            None => t.clone(),
        }
    }

    /// Maps a method: declaring type, name and every type in the signature.
    pub fn get_method(&self, method: &Method) -> Method {
        let mapping = self.type_mappings.get(method.declaring_type.component_descriptor());
        let name = mapping
            .and_then(|m| m.methods.get(&MethodSignature::of(method)))
            .cloned()
            .unwrap_or_else(|| method.name.clone());
        Method {
            declaring_type: self.get_type(&method.declaring_type),
            name,
            parameter_types: method.parameter_types.iter().map(|t| self.get_type(t)).collect(),
            return_type: self.get_type(&method.return_type),
        }
    }

    /// Maps a field: declaring type, name and field type.
    pub fn get_field(&self, field: &Field) -> Field {
        let mapping = self.type_mappings.get(field.declaring_type.component_descriptor());
        let name = mapping
            .and_then(|m| m.fields.get(&FieldSignature::of(field)))
            .cloned()
            .unwrap_or_else(|| field.name.clone());
        Field {
            declaring_type: self.get_type(&field.declaring_type),
            name,
            field_type: self.get_type(&field.field_type),
        }
    }

    pub fn get_member(&self, member: &Member) -> Member {
        match member {
            Member::Method(m) => Member::Method(self.get_method(m)),
            Member::Field(f) => Member::Field(self.get_field(f)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn method(declaring: &str, name: &str, params: &[&str], ret: &str) -> Method {
        Method {
            declaring_type: TypeDescriptor::new(declaring),
            name: name.to_string(),
            parameter_types: params.iter().map(|p| TypeDescriptor::new(p)).collect(),
            return_type: TypeDescriptor::new(ret),
        }
    }

    fn field(declaring: &str, name: &str, field_type: &str) -> Field {
        Field {
            declaring_type: TypeDescriptor::new(declaring),
            name: name.to_string(),
            field_type: TypeDescriptor::new(field_type),
        }
    }

    #[test]
    fn empty_mapping() {
        let mapping = ApiMapping::new();
        assert!(mapping.is_empty());

        let t = TypeDescriptor::new("La/a;");
        assert_eq!(mapping.get_type(&t), t);
    }

    #[test]
    fn type_rename_preserves_array_arity() {
        let mut mapping = ApiMapping::new();
        mapping.add_type(TypeDescriptor::new("La/a;"), TypeDescriptor::new("Lapp/Foo;"));

        assert_eq!(mapping.get_type(&TypeDescriptor::new("La/a;")).descriptor(), "Lapp/Foo;");
        assert_eq!(mapping.get_type(&TypeDescriptor::new("[[La/a;")).descriptor(), "[[Lapp/Foo;");
    }

    #[test]
    fn method_rename_is_overload_precise() {
        let mut mapping = ApiMapping::new();
        let int_overload = method("La/a;", "a", &["I"], "V");
        mapping.add_method(&int_overload, "setCount");

        let renamed = mapping.get_method(&int_overload);
        assert_eq!(renamed.name, "setCount");

        // Same simple name, different signature: no rule, name passes through.
        let string_overload = method("La/a;", "a", &["Ljava/lang/String;"], "V");
        let unrenamed = mapping.get_method(&string_overload);
        assert_eq!(unrenamed.name, "a");
    }

    #[test]
    fn method_signature_types_follow_class_renames() {
        let mut mapping = ApiMapping::new();
        mapping.add_type(TypeDescriptor::new("La/b;"), TypeDescriptor::new("Lapp/Bar;"));

        // Declaring type has no rule but the parameter and return types do.
        let m = method("La/a;", "run", &["La/b;"], "La/b;");
        let mapped = mapping.get_method(&m);
        assert_eq!(mapped.declaring_type.descriptor(), "La/a;");
        assert_eq!(mapped.name, "run");
        assert_eq!(mapped.parameter_types[0].descriptor(), "Lapp/Bar;");
        assert_eq!(mapped.return_type.descriptor(), "Lapp/Bar;");
    }

    #[test]
    fn field_rename_maps_name_and_types() {
        let mut mapping = ApiMapping::new();
        mapping.add_type(TypeDescriptor::new("La/a;"), TypeDescriptor::new("Lapp/Foo;"));
        let f = field("La/a;", "b", "[La/a;");
        mapping.add_field(&f, "items");

        let mapped = mapping.get_field(&f);
        assert_eq!(mapped.declaring_type.descriptor(), "Lapp/Foo;");
        assert_eq!(mapped.name, "items");
        assert_eq!(mapped.field_type.descriptor(), "[Lapp/Foo;");
    }

    #[test]
    fn unmapped_member_passes_through() {
        let mut mapping = ApiMapping::new();
        mapping.add_type(TypeDescriptor::new("La/a;"), TypeDescriptor::new("Lapp/Foo;"));

        let m = method("Ljava/lang/Object;", "<init>", &[], "V");
        assert_eq!(mapping.get_member(&Member::Method(m.clone())), Member::Method(m));
    }

    #[test]
    fn member_rules_compose_with_type_rule_in_any_order() {
        let mut mapping = ApiMapping::new();
        let f = field("La/a;", "c", "I");
        mapping.add_field(&f, "count");
        mapping.add_type(TypeDescriptor::new("La/a;"), TypeDescriptor::new("Lapp/Foo;"));

        let mapped = mapping.get_field(&f);
        assert_eq!(mapped.declaring_type.descriptor(), "Lapp/Foo;");
        assert_eq!(mapped.name, "count");
    }
}
