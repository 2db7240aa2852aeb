//! Process-wide table descriptor registry.
//!
//! Record types submit a [`DescriptorRegistration`] (usually through
//! [`register_descriptor!`](crate::register_descriptor)); the first lookup
//! collects every submitted registration into a type → descriptor map
//! exactly once, behind a [`OnceLock`]. After population the map is
//! read-only and safe for unsynchronized concurrent reads.
//!
//! # Example
//! ```ignore
//! use tsqlgen::registry;
//!
//! tsqlgen::register_descriptor!(Client, client_descriptor);
//!
//! let descriptor = registry::descriptor::<Client>()?;
//! assert_eq!(descriptor.table_name(), "Client");
//! # Ok::<(), tsqlgen::BuildError>(())
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{BuildError, BuildResult};
use crate::table::{Record, TableDescriptor};

/// Registration entry for one record type's descriptor.
///
/// Submit with `inventory::submit!`, or use the
/// [`register_descriptor!`](crate::register_descriptor) macro which fills in
/// the glue.
pub struct DescriptorRegistration {
    /// The registered record type.
    pub type_id: fn() -> TypeId,
    /// Builds the boxed `BuildResult<Arc<TableDescriptor<T>>>` for that type.
    pub build: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(DescriptorRegistration);

static DESCRIPTORS: OnceLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>> = OnceLock::new();

fn descriptors() -> &'static HashMap<TypeId, Box<dyn Any + Send + Sync>> {
    DESCRIPTORS.get_or_init(|| {
        let mut descriptors = HashMap::new();
        for registration in inventory::iter::<DescriptorRegistration> {
            descriptors.insert((registration.type_id)(), (registration.build)());
        }
        descriptors
    })
}

/// Look up the one descriptor registered for `T`.
///
/// A type with no registration is an argument error; a descriptor whose
/// construction failed surfaces that failure to every caller.
pub fn descriptor<T: Record>() -> BuildResult<Arc<TableDescriptor<T>>> {
    let stored = descriptors().get(&TypeId::of::<T>()).ok_or_else(|| {
        BuildError::argument(format!(
            "no table descriptor is registered for '{}'",
            T::TYPE_NAME
        ))
    })?;

    stored
        .downcast_ref::<BuildResult<Arc<TableDescriptor<T>>>>()
        .ok_or_else(|| {
            BuildError::argument(format!(
                "the registration for '{}' does not build a descriptor of that type",
                T::TYPE_NAME
            ))
        })?
        .clone()
}

/// Register a record type's descriptor-building function.
///
/// ```ignore
/// tsqlgen::register_descriptor!(Client, client_descriptor);
/// ```
///
/// The function must have the signature
/// `fn() -> BuildResult<TableDescriptor<Client>>`; it runs once, on the
/// registry's first access.
#[macro_export]
macro_rules! register_descriptor {
    ($record:ty, $build:path) => {
        $crate::inventory::submit! {
            $crate::registry::DescriptorRegistration {
                type_id: || ::std::any::TypeId::of::<$record>(),
                build: || {
                    let built: $crate::BuildResult<
                        ::std::sync::Arc<$crate::TableDescriptor<$record>>,
                    > = $build().map(::std::sync::Arc::new);
                    ::std::boxed::Box::new(built)
                },
            }
        }
    };
}
