pub(crate) mod fixture;

#[cfg(test)]
mod tests {
    use crate::types::{Field, Member, Method, TypeDescriptor};

    #[test]
    fn descriptor_source_names() {
        assert_eq!(TypeDescriptor::new("Lcom/basic/Test;").source_name(), "com.basic.Test");
        assert_eq!(TypeDescriptor::new("I").source_name(), "int");
        assert_eq!(TypeDescriptor::new("V").source_name(), "void");
        assert_eq!(TypeDescriptor::new("[[J").source_name(), "long[][]");
        assert_eq!(TypeDescriptor::new("[Ljava/lang/String;").source_name(), "java.lang.String[]");

        // Unparseable descriptors are returned verbatim
        assert_eq!(TypeDescriptor::new("Q").source_name(), "Q");
    }

    #[test]
    fn descriptor_array_arity() {
        let a = TypeDescriptor::new("[[I");
        assert_eq!(a.array_arity(), 2);
        assert_eq!(a.component_descriptor(), "I");
        assert_eq!(a.component_type(), TypeDescriptor::new("I"));
        assert_eq!(a.component_type().with_array_arity(2), a);

        let o = TypeDescriptor::new("Lapp/Foo;");
        assert_eq!(o.array_arity(), 0);
        assert_eq!(o.with_array_arity(0), o);
    }

    #[test]
    fn member_display() {
        let method = Method {
            declaring_type: TypeDescriptor::new("Lapp/Foo;"),
            name: "bar".to_string(),
            parameter_types: vec![TypeDescriptor::new("I"), TypeDescriptor::new("[Lapp/Bar;")],
            return_type: TypeDescriptor::new("Z"),
        };
        assert_eq!(method.to_string(), "Lapp/Foo;->bar(I[Lapp/Bar;)Z");

        let field = Field {
            declaring_type: TypeDescriptor::new("Lapp/Foo;"),
            name: "count".to_string(),
            field_type: TypeDescriptor::new("I"),
        };
        assert_eq!(field.to_string(), "Lapp/Foo;->count:I");

        let member = Member::from(method);
        assert_eq!(member.declaring_type(), &TypeDescriptor::new("Lapp/Foo;"));
        assert_eq!(member.name(), "bar");
        assert_eq!(Member::from(field).name(), "count");
    }
}
