//! Shared test schema: records, facets, and their table descriptors.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use tsqlgen::{
    BuildResult, ColumnDef, Facet, MemberId, Record, Scalar, ScalarKind, ScalarValue,
    SqlOperation, TableDescriptor, TableDescriptorBuilder, col,
};

// ==================== Facets ====================

pub trait GuidIdentifier {
    fn id(&self) -> Uuid;
}

pub trait CreateFields {
    fn created_by_user_id(&self) -> Uuid;
    fn created_date_utc(&self) -> NaiveDateTime;
}

pub trait EditFields {
    fn modified_by_user_id(&self) -> Uuid;
    fn modified_date_utc(&self) -> NaiveDateTime;
}

pub const GUID_IDENTIFIER: Facet = Facet {
    type_name: "GuidIdentifier",
    members: &["Id"],
};

pub const CREATE_FIELDS: Facet = Facet {
    type_name: "CreateFields",
    members: &["CreatedByUserId", "CreatedDateUtc"],
};

pub const EDIT_FIELDS: Facet = Facet {
    type_name: "EditFields",
    members: &["ModifiedByUserId", "ModifiedDateUtc"],
};

/// Map the generated guid key shared by most tables.
pub fn map_guid_identifier<T: Record + GuidIdentifier>(
    builder: TableDescriptorBuilder<T>,
) -> BuildResult<TableDescriptorBuilder<T>> {
    builder.map(col(MemberId::new("GuidIdentifier", "Id"), |r: &T| r.id()).key(true)?)
}

/// Map the creation-audit columns shared by audited tables.
pub fn map_create_fields<T: Record + CreateFields>(
    builder: TableDescriptorBuilder<T>,
) -> BuildResult<TableDescriptorBuilder<T>> {
    builder
        .map(
            col(MemberId::new("CreateFields", "CreatedByUserId"), |r: &T| {
                r.created_by_user_id()
            })
            .ignore(SqlOperation::UPDATE)?,
        )?
        .map(
            col(MemberId::new("CreateFields", "CreatedDateUtc"), |r: &T| {
                r.created_date_utc()
            })
            .generated(false)?,
        )
}

/// Map the modification-audit columns shared by audited tables.
pub fn map_edit_fields<T: Record + EditFields>(
    builder: TableDescriptorBuilder<T>,
) -> BuildResult<TableDescriptorBuilder<T>> {
    builder
        .map(col(MemberId::new("EditFields", "ModifiedByUserId"), |r: &T| {
            r.modified_by_user_id()
        }))?
        .map(
            col(MemberId::new("EditFields", "ModifiedDateUtc"), |r: &T| {
                r.modified_date_utc()
            })
            .generated(true)?,
        )
}

// ==================== Client ====================

pub struct Client {
    pub id: Uuid,
    pub created_by_user_id: Uuid,
    pub created_date_utc: NaiveDateTime,
    pub modified_by_user_id: Uuid,
    pub modified_date_utc: NaiveDateTime,
    pub name: String,
    pub is_active: bool,
}

impl GuidIdentifier for Client {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl CreateFields for Client {
    fn created_by_user_id(&self) -> Uuid {
        self.created_by_user_id
    }

    fn created_date_utc(&self) -> NaiveDateTime {
        self.created_date_utc
    }
}

impl EditFields for Client {
    fn modified_by_user_id(&self) -> Uuid {
        self.modified_by_user_id
    }

    fn modified_date_utc(&self) -> NaiveDateTime {
        self.modified_date_utc
    }
}

impl Record for Client {
    const TYPE_NAME: &'static str = "Client";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![
            col(MemberId::new("Client", "Id"), |c: &Client| c.id),
            col(MemberId::new("Client", "CreatedByUserId"), |c: &Client| {
                c.created_by_user_id
            }),
            col(MemberId::new("Client", "CreatedDateUtc"), |c: &Client| {
                c.created_date_utc
            }),
            col(MemberId::new("Client", "ModifiedByUserId"), |c: &Client| {
                c.modified_by_user_id
            }),
            col(MemberId::new("Client", "ModifiedDateUtc"), |c: &Client| {
                c.modified_date_utc
            }),
            col(MemberId::new("Client", "Name"), |c: &Client| c.name.clone()),
            col(MemberId::new("Client", "IsActive"), |c: &Client| c.is_active),
        ]
    }

    fn facets() -> &'static [Facet] {
        &[GUID_IDENTIFIER, CREATE_FIELDS, EDIT_FIELDS]
    }
}

pub fn client_descriptor() -> BuildResult<TableDescriptor<Client>> {
    let builder = TableDescriptorBuilder::<Client>::new()?;
    let builder = map_guid_identifier(builder)?;
    let builder = map_create_fields(builder)?;
    let builder = map_edit_fields(builder)?;
    builder.auto_map()?.finish()
}

pub fn client() -> Arc<TableDescriptor<Client>> {
    Arc::new(client_descriptor().expect("client descriptor builds"))
}

// ==================== ClientUser ====================

pub struct ClientUser {
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub is_active: bool,
}

impl Record for ClientUser {
    const TYPE_NAME: &'static str = "ClientUser";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![
            col(MemberId::new("ClientUser", "ClientId"), |c: &ClientUser| {
                c.client_id
            }),
            col(MemberId::new("ClientUser", "UserId"), |c: &ClientUser| {
                c.user_id
            }),
            col(MemberId::new("ClientUser", "IsActive"), |c: &ClientUser| {
                c.is_active
            }),
        ]
    }
}

pub fn client_user_descriptor() -> BuildResult<TableDescriptor<ClientUser>> {
    TableDescriptorBuilder::<ClientUser>::new()?
        .table("Client_User")?
        .map(
            col(MemberId::new("ClientUser", "ClientId"), |c: &ClientUser| {
                c.client_id
            })
            .key(false)?,
        )?
        .map(
            col(MemberId::new("ClientUser", "UserId"), |c: &ClientUser| {
                c.user_id
            })
            .key(false)?,
        )?
        .auto_map()?
        .finish()
}

pub fn client_user() -> Arc<TableDescriptor<ClientUser>> {
    Arc::new(client_user_descriptor().expect("client_user descriptor builds"))
}

// ==================== SuperEmployee ====================

pub struct SuperEmployee {
    pub employee_id: Uuid,
    pub some_awesome_field_a: Option<String>,
    pub some_awesome_field_b: Option<String>,
}

impl Record for SuperEmployee {
    const TYPE_NAME: &'static str = "SuperEmployee";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![
            col(
                MemberId::new("SuperEmployee", "EmployeeId"),
                |e: &SuperEmployee| e.employee_id,
            ),
            col(
                MemberId::new("SuperEmployee", "SomeAwesomeFieldA"),
                |e: &SuperEmployee| e.some_awesome_field_a.clone(),
            ),
            col(
                MemberId::new("SuperEmployee", "SomeAwesomeFieldB"),
                |e: &SuperEmployee| e.some_awesome_field_b.clone(),
            ),
        ]
    }
}

pub fn super_employee_descriptor() -> BuildResult<TableDescriptor<SuperEmployee>> {
    TableDescriptorBuilder::<SuperEmployee>::new()?
        .map(
            col(
                MemberId::new("SuperEmployee", "EmployeeId"),
                |e: &SuperEmployee| e.employee_id,
            )
            .key(false)?,
        )?
        .auto_map()?
        .finish()
}

pub fn super_employee() -> Arc<TableDescriptor<SuperEmployee>> {
    Arc::new(super_employee_descriptor().expect("super_employee descriptor builds"))
}

// ==================== Purchase ====================

pub struct Purchase {
    pub name: String,
    pub cost: Decimal,
}

impl Record for Purchase {
    const TYPE_NAME: &'static str = "Purchase";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![
            col(MemberId::new("Purchase", "Name"), |p: &Purchase| {
                p.name.clone()
            }),
            col(MemberId::new("Purchase", "Cost"), |p: &Purchase| p.cost),
        ]
    }
}

pub fn purchase_descriptor() -> BuildResult<TableDescriptor<Purchase>> {
    TableDescriptorBuilder::<Purchase>::new()?
        .map(
            col(MemberId::new("Purchase", "Name"), |p: &Purchase| {
                p.name.clone()
            })
            .length(20),
        )?
        .map(
            col(MemberId::new("Purchase", "Cost"), |p: &Purchase| p.cost).precision(10, 2),
        )?
        .finish()
}

pub fn purchase() -> Arc<TableDescriptor<Purchase>> {
    Arc::new(purchase_descriptor().expect("purchase descriptor builds"))
}

// ==================== StoredFile ====================

pub struct StoredFile {
    pub id: Uuid,
    pub name: String,
    pub file_bytes: Option<Vec<u8>>,
}

impl GuidIdentifier for StoredFile {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for StoredFile {
    const TYPE_NAME: &'static str = "StoredFile";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![
            col(MemberId::new("StoredFile", "Id"), |f: &StoredFile| f.id),
            col(MemberId::new("StoredFile", "Name"), |f: &StoredFile| {
                f.name.clone()
            }),
            col(MemberId::new("StoredFile", "FileBytes"), |f: &StoredFile| {
                f.file_bytes.clone()
            }),
        ]
    }

    fn facets() -> &'static [Facet] {
        &[GUID_IDENTIFIER]
    }
}

pub fn stored_file_descriptor() -> BuildResult<TableDescriptor<StoredFile>> {
    let builder = TableDescriptorBuilder::<StoredFile>::new()?;
    let builder = map_guid_identifier(builder)?;
    builder
        .map(
            col(MemberId::new("StoredFile", "Name"), |f: &StoredFile| {
                f.name.clone()
            })
            .length(100),
        )?
        .map(
            col(MemberId::new("StoredFile", "FileBytes"), |f: &StoredFile| {
                f.file_bytes.clone()
            })
            .length(u32::MAX),
        )?
        .finish()
}

pub fn stored_file() -> Arc<TableDescriptor<StoredFile>> {
    Arc::new(stored_file_descriptor().expect("stored_file descriptor builds"))
}

// ==================== EnumState ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumState {
    ValueA = 1,
    ValueB = 2,
    ValueC = 4,
}

impl Scalar for EnumState {
    const KIND: ScalarKind = ScalarKind::Int16;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Int16(self as i16)
    }
}

// ==================== LargeRecord ====================

const LARGE_PROPERTY_NAMES: [&str; 35] = [
    "Property1",
    "Property2",
    "Property3",
    "Property4",
    "Property5",
    "Property6",
    "Property7",
    "Property8",
    "Property9",
    "Property10",
    "Property11",
    "Property12",
    "Property13",
    "Property14",
    "Property15",
    "Property16",
    "Property17",
    "Property18",
    "Property19",
    "Property20",
    "Property21",
    "Property22",
    "Property23",
    "Property24",
    "Property25",
    "Property26",
    "Property27",
    "Property28",
    "Property29",
    "Property30",
    "Property31",
    "Property32",
    "Property33",
    "Property34",
    "Property35",
];

/// Wide enough that minified aliases roll past the single-digit range.
pub struct LargeRecord {
    pub id_a: Uuid,
    pub id_b: Uuid,
    pub state: EnumState,
    pub properties: [Option<String>; 35],
}

impl Record for LargeRecord {
    const TYPE_NAME: &'static str = "LargeRecord";

    fn members() -> Vec<ColumnDef<Self>> {
        let mut members = vec![
            col(MemberId::new("LargeRecord", "IdA"), |r: &LargeRecord| r.id_a),
            col(MemberId::new("LargeRecord", "IdB"), |r: &LargeRecord| r.id_b),
            col(MemberId::new("LargeRecord", "State"), |r: &LargeRecord| {
                r.state
            }),
        ];
        for (index, name) in LARGE_PROPERTY_NAMES.into_iter().enumerate() {
            members.push(col(
                MemberId::new("LargeRecord", name),
                move |r: &LargeRecord| r.properties[index].clone(),
            ));
        }
        members
    }
}

pub fn large_record_descriptor() -> BuildResult<TableDescriptor<LargeRecord>> {
    TableDescriptorBuilder::<LargeRecord>::new()?
        .map(
            col(MemberId::new("LargeRecord", "IdA"), |r: &LargeRecord| r.id_a).key(false)?,
        )?
        .map(
            col(MemberId::new("LargeRecord", "IdB"), |r: &LargeRecord| r.id_b).key(false)?,
        )?
        .auto_map()?
        .finish()
}

pub fn large_record() -> Arc<TableDescriptor<LargeRecord>> {
    Arc::new(large_record_descriptor().expect("large_record descriptor builds"))
}

// ==================== Misconfigured ====================

/// A record whose registered descriptor cannot be built; the registry must
/// replay the failure to every caller.
pub struct Misconfigured {
    pub value: i32,
}

impl Record for Misconfigured {
    const TYPE_NAME: &'static str = "Misconfigured";

    fn members() -> Vec<ColumnDef<Self>> {
        vec![col(
            MemberId::new("Misconfigured", "Value"),
            |m: &Misconfigured| m.value,
        )]
    }
}

pub fn misconfigured_descriptor() -> BuildResult<TableDescriptor<Misconfigured>> {
    TableDescriptorBuilder::<Misconfigured>::new()?
        .table("1 not a name")?
        .auto_map()?
        .finish()
}

// ==================== Registry registrations ====================

tsqlgen::register_descriptor!(Client, client_descriptor);
tsqlgen::register_descriptor!(ClientUser, client_user_descriptor);
tsqlgen::register_descriptor!(Misconfigured, misconfigured_descriptor);
