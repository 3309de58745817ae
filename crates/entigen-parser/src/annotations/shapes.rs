use entigen_core::{OrderedProperty, TableIndex, parse_order_spec};

use super::{AnnotationShape, Arguments, ShapeError};

macro_rules! marker_shape {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl AnnotationShape for $name {
            const NAME: &'static str = stringify!($name);

            fn from_args(_args: &Arguments<'_>) -> Result<Self, ShapeError> {
                Ok(Self)
            }
        }
    };
}

marker_shape!(
    /// `@Transient`: the field is not persisted.
    Transient
);
marker_shape!(
    /// `@Keep`: the declaration (or the whole type) is hand-maintained.
    Keep
);
marker_shape!(Unique);

/// `@Entity(schema, active, generateConstructors, generateGettersSetters)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityArgs {
    pub schema: Option<String>,
    pub active: bool,
    pub generate_constructors: bool,
    pub generate_accessors: bool,
}

impl AnnotationShape for EntityArgs {
    const NAME: &'static str = "Entity";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            schema: args.string("schema")?,
            active: args.bool("active")?.unwrap_or(false),
            generate_constructors: args.bool("generateConstructors")?.unwrap_or(true),
            generate_accessors: args.bool("generateGettersSetters")?.unwrap_or(true),
        })
    }
}

/// `@Index(value, name, unique)`. On a field only `name` and `unique`
/// matter; inside `@Table(indexes = ...)` `value` lists the properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexArgs {
    pub value: Option<String>,
    pub name: Option<String>,
    pub unique: bool,
}

impl IndexArgs {
    /// Convert an entity-level index, parsing its property list.
    ///
    /// # Errors
    /// Returns `ShapeError::Invalid` for a missing or malformed `value`.
    pub fn to_table_index(&self) -> Result<TableIndex, ShapeError> {
        let spec = self
            .value
            .as_deref()
            .ok_or_else(|| ShapeError::invalid("value", "must list the indexed properties"))?;
        let properties =
            parse_order_spec(spec).map_err(|e| ShapeError::invalid("value", e.to_string()))?;
        Ok(TableIndex {
            name: self.name.clone(),
            properties,
            is_unique: self.unique,
        })
    }
}

impl AnnotationShape for IndexArgs {
    const NAME: &'static str = "Index";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            value: args.string("value")?,
            name: args.string("name")?,
            unique: args.bool("unique")?.unwrap_or(false),
        })
    }
}

/// `@Table(name, indexes = {@Index(...), ...})`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableArgs {
    pub name: Option<String>,
    pub indexes: Vec<IndexArgs>,
}

impl AnnotationShape for TableArgs {
    const NAME: &'static str = "Table";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            name: args.string("name")?,
            indexes: args.nested("indexes")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdArgs {
    pub autoincrement: bool,
    pub assignable: bool,
}

impl AnnotationShape for IdArgs {
    const NAME: &'static str = "Id";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            autoincrement: args.bool("autoincrement")?.unwrap_or(false),
            assignable: args.bool("assignable")?.unwrap_or(false),
        })
    }
}

/// `@Uid` or `@Uid(1234L)`. A bare marker requests a new uid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UidArgs {
    pub value: Option<i64>,
}

impl AnnotationShape for UidArgs {
    const NAME: &'static str = "Uid";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            value: args.int("value")?,
        })
    }
}

impl UidArgs {
    /// `0` stands for "assign a fresh uid".
    #[must_use]
    pub fn uid(self) -> i64 {
        self.value.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameInDbArgs {
    pub value: String,
}

impl AnnotationShape for NameInDbArgs {
    const NAME: &'static str = "NameInDb";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        let value = args
            .string("value")?
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ShapeError::Missing("a non-empty name is required".to_string()))?;
        Ok(Self { value })
    }
}

/// `@Convert(converter = X.class, dbType = Y.class)`; both are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertArgs {
    pub converter: String,
    pub db_type: String,
}

impl AnnotationShape for ConvertArgs {
    const NAME: &'static str = "Convert";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        match (args.class("converter")?, args.class("dbType")?) {
            (Some(converter), Some(db_type)) => Ok(Self { converter, db_type }),
            (None, Some(_)) => Err(ShapeError::Missing(
                "'converter' must be set together with 'dbType'".to_string(),
            )),
            (Some(_), None) => Err(ShapeError::Missing(
                "'dbType' must be set together with 'converter'".to_string(),
            )),
            (None, None) => Err(ShapeError::Missing(
                "both 'converter' and 'dbType' are required".to_string(),
            )),
        }
    }
}

/// `@JoinProperty(name, referencedName)` inside `@Relation(joinProperties = ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPropertyArgs {
    pub name: String,
    pub referenced_name: String,
}

impl AnnotationShape for JoinPropertyArgs {
    const NAME: &'static str = "JoinProperty";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        match (args.string("name")?, args.string("referencedName")?) {
            (Some(name), Some(referenced_name)) => Ok(Self {
                name,
                referenced_name,
            }),
            _ => Err(ShapeError::Missing(
                "both 'name' and 'referencedName' are required".to_string(),
            )),
        }
    }
}

/// `@Relation(idProperty, backlink, joinProperties)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationArgs {
    pub id_property: Option<String>,
    pub backlink: Option<String>,
    pub join_properties: Vec<JoinPropertyArgs>,
}

impl AnnotationShape for RelationArgs {
    const NAME: &'static str = "Relation";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        Ok(Self {
            id_property: args.string("idProperty")?.filter(|s| !s.is_empty()),
            backlink: args.string("backlink")?.filter(|s| !s.is_empty()),
            join_properties: args.nested("joinProperties")?,
        })
    }
}

/// `@JoinEntity(entity = Link.class, sourceProperty, targetProperty)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEntityArgs {
    pub entity: String,
    pub source_property: String,
    pub target_property: String,
}

impl AnnotationShape for JoinEntityArgs {
    const NAME: &'static str = "JoinEntity";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        let entity = args.class("entity")?;
        let source_property = args.string("sourceProperty")?;
        let target_property = args.string("targetProperty")?;
        match (entity, source_property, target_property) {
            (Some(entity), Some(source_property), Some(target_property)) => Ok(Self {
                entity,
                source_property,
                target_property,
            }),
            _ => Err(ShapeError::Missing(
                "'entity', 'sourceProperty' and 'targetProperty' are all required".to_string(),
            )),
        }
    }
}

/// `@OrderBy("date DESC, id")`; no value orders by the target's id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderByArgs {
    pub order: Vec<OrderedProperty>,
}

impl AnnotationShape for OrderByArgs {
    const NAME: &'static str = "OrderBy";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        let order = match args.string("value")? {
            Some(spec) if !spec.trim().is_empty() => {
                parse_order_spec(&spec).map_err(|e| ShapeError::invalid("value", e.to_string()))?
            }
            _ => Vec::new(),
        };
        Ok(Self { order })
    }
}

/// `@Generated` or `@Generated(hash = N)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratedArgs {
    pub hash: Option<i32>,
}

impl AnnotationShape for GeneratedArgs {
    const NAME: &'static str = "Generated";

    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError> {
        let hash = args
            .int("hash")?
            .map(|value| {
                i32::try_from(value).map_err(|_| {
                    ShapeError::invalid("hash", format!("{value} does not fit a 32-bit hash"))
                })
            })
            .transpose()?;
        Ok(Self { hash })
    }
}
