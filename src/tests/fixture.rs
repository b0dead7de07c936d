/* Assembles synthetic dex images in memory for the extraction tests */

use crate::dex::dex_file::{DexString, FieldItem, Header, MethodItem, TypeList, DEX_FILE_MAGIC, ENDIAN_CONSTANT, NO_INDEX};
use crate::dex::{write_u4, write_x};

/// Table contents for a minimal dex image. Ids are positional indices into
/// the preceding tables, exactly as in the container format.
#[derive(Default)]
pub(crate) struct DexFixture {
    /// string_data items, index order
    pub strings: Vec<&'static str>,
    /// type_ids: indices into `strings`
    pub types: Vec<usize>,
    /// proto_ids: (shorty string id, return type id, parameter type ids)
    pub protos: Vec<(usize, usize, Vec<usize>)>,
    /// field_ids: (class type id, field type id, name string id)
    pub fields: Vec<(usize, usize, usize)>,
    /// method_ids: (class type id, proto id, name string id)
    pub methods: Vec<(usize, usize, usize)>,
    /// class_defs: the class type id per entry
    pub class_defs: Vec<usize>,
}

impl DexFixture {
    pub fn build(&self) -> Vec<u8> {
        let string_ids_off = 0x70usize;
        let type_ids_off = string_ids_off + 4 * self.strings.len();
        let proto_ids_off = type_ids_off + 4 * self.types.len();
        let field_ids_off = proto_ids_off + 12 * self.protos.len();
        let method_ids_off = field_ids_off + 8 * self.fields.len();
        let class_defs_off = method_ids_off + 8 * self.methods.len();
        let data_off = class_defs_off + 32 * self.class_defs.len();

        // Data section: string_data items then 4-aligned type lists
        let mut data = vec![];
        let mut string_offs = vec![];
        for s in &self.strings {
            string_offs.push(data_off + data.len());
            DexString::from_string(s).write(&mut data);
        }
        let mut param_offs = vec![];
        for (_, _, params) in &self.protos {
            if params.is_empty() {
                param_offs.push(0);
                continue;
            }
            while (data_off + data.len()) % 4 != 0 {
                data.push(0);
            }
            param_offs.push(data_off + data.len());
            TypeList(params.clone()).write(&mut data);
        }

        let header = Header {
            magic: DEX_FILE_MAGIC,
            checksum: 0,
            signature: [0; 20],
            file_size: (data_off + data.len()) as u32,
            header_size: 0x70,
            endian_tag: ENDIAN_CONSTANT,
            link_size: 0,
            link_off: 0,
            map_off: 0,
            string_ids_size: self.strings.len() as u32,
            string_ids_off: string_ids_off as u32,
            type_ids_size: self.types.len() as u32,
            type_ids_off: type_ids_off as u32,
            proto_ids_size: self.protos.len() as u32,
            proto_ids_off: proto_ids_off as u32,
            field_ids_size: self.fields.len() as u32,
            field_ids_off: field_ids_off as u32,
            method_ids_size: self.methods.len() as u32,
            method_ids_off: method_ids_off as u32,
            class_defs_size: self.class_defs.len() as u32,
            class_defs_off: class_defs_off as u32,
            data_size: data.len() as u32,
            data_off: data_off as u32,
        };

        let mut bytes = vec![];
        header.write(&mut bytes);
        for off in &string_offs {
            write_u4(&mut bytes, *off as u32);
        }
        for t in &self.types {
            write_u4(&mut bytes, *t as u32);
        }
        for (i, (shorty_idx, return_type_idx, _)) in self.protos.iter().enumerate() {
            write_u4(&mut bytes, *shorty_idx as u32);
            write_u4(&mut bytes, *return_type_idx as u32);
            write_u4(&mut bytes, param_offs[i] as u32);
        }
        for (class_idx, type_idx, name_idx) in &self.fields {
            FieldItem { class_idx: *class_idx, type_idx: *type_idx, name_idx: *name_idx }.write(&mut bytes);
        }
        for (class_idx, proto_idx, name_idx) in &self.methods {
            MethodItem { class_idx: *class_idx, proto_idx: *proto_idx, name_idx: *name_idx }.write(&mut bytes);
        }
        for class_idx in &self.class_defs {
            write_u4(&mut bytes, *class_idx as u32);
            write_u4(&mut bytes, 0x1); // ACC_PUBLIC
            write_u4(&mut bytes, NO_INDEX as u32);
            write_u4(&mut bytes, 0); // interfaces_off
            write_u4(&mut bytes, NO_INDEX as u32);
            write_u4(&mut bytes, 0); // annotations_off
            write_u4(&mut bytes, 0); // class_data_off
            write_u4(&mut bytes, 0); // static_values_off
        }
        assert_eq!(bytes.len(), data_off);
        write_x(&mut bytes, &data);
        bytes
    }
}

/// One class `Lapp/Foo;` declaring `bar()V`, plus a reference to
/// `Ljava/lang/Object;.<init>()V`.
pub(crate) fn scenario_dex() -> Vec<u8> {
    DexFixture {
        strings: vec!["<init>", "Lapp/Foo;", "Ljava/lang/Object;", "V", "bar"],
        types: vec![1, 2, 3],
        protos: vec![(3, 2, vec![])],
        fields: vec![],
        methods: vec![(0, 0, 4), (1, 0, 0)],
        class_defs: vec![0],
    }
    .build()
}

/// Two declared classes (`Lapp/Bar;` member-less), declared and referenced
/// methods and fields, and a multi-parameter prototype.
///
/// Type ids: 0 `I`, 1 `Lapp/Bar;`, 2 `Lapp/Foo;`, 3 `Ljava/lang/Object;`,
/// 4 `Ljava/lang/String;`, 5 `V`.
pub(crate) fn rich_dex() -> Vec<u8> {
    DexFixture {
        strings: vec![
            "<init>",             // 0
            "I",                  // 1
            "Lapp/Bar;",          // 2
            "Lapp/Foo;",          // 3
            "Ljava/lang/Object;", // 4
            "Ljava/lang/String;", // 5
            "V",                  // 6
            "bar",                // 7
            "count",              // 8
            "name",               // 9
            "run",                // 10
        ],
        types: vec![1, 2, 3, 4, 5, 6],
        protos: vec![
            (6, 5, vec![]),     // ()V
            (6, 5, vec![0]),    // (I)V
            (6, 5, vec![1, 0]), // (Lapp/Bar;I)V
        ],
        fields: vec![
            (2, 0, 8), // Lapp/Foo;->count:I           declared
            (3, 0, 8), // Ljava/lang/Object;->count:I  referenced
        ],
        methods: vec![
            (2, 1, 7),  // Lapp/Foo;->bar(I)V                 declared
            (2, 2, 10), // Lapp/Foo;->run(Lapp/Bar;I)V        declared
            (3, 0, 0),  // Ljava/lang/Object;-><init>()V      referenced
            (4, 0, 9),  // Ljava/lang/String;->name()V        referenced
        ],
        class_defs: vec![2, 1], // Lapp/Foo; first, member-less Lapp/Bar; second
    }
    .build()
}
