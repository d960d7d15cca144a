//! Typed loader for Unity scene files.
//!
//! A Unity scene is a YAML stream of small documents, one per object. Each
//! document root carries a class tag (`--- !u!108 &5`) and wraps the object
//! twice: an outer mapping whose only key names the class, holding the
//! property mapping. This crate walks the parser events directly, dispatches
//! each document on its tag through a [`Catalogue`], and decodes registered
//! classes into typed structs declared with [`decodable!`]. Documents with an
//! unknown tag are skipped and counted.
//!
//! ```rust
//! use indoc::indoc;
//! use saphyr_unity::{from_str, unity::Light, Catalogue};
//!
//! let yaml = indoc! {"
//!     %YAML 1.1
//!     %TAG !u! tag:unity3d.com,2011:
//!     --- !u!108 &5
//!     Light:
//!       m_GameObject: {fileID: 0}
//!       m_Enabled: 1
//!       m_Color: {r: 1, g: 0.95, b: 0.84, a: 1}
//!       m_Intensity: 0.5
//!     --- !u!999 &6
//!     Unknown:
//!       m_Whatever: 1
//! "};
//!
//! let scene = from_str(yaml, &Catalogue::unity()).unwrap();
//! let light = scene.of_type::<Light>().next().unwrap();
//! assert!(light.enabled);
//! assert_eq!(light.intensity, 0.5);
//! assert_eq!(scene.unknown_tags.count("tag:unity3d.com,2011:999"), 1);
//! ```

use std::io::Read;

pub mod budget;
pub mod builder;
pub mod catalogue;
pub mod component_list;
mod de;
pub mod error;
pub mod events;
pub mod live_events;
pub mod loader;
mod macros;
pub mod options;
pub mod parse_scalars;
pub mod resolve;
pub mod schema;
pub mod unity;
pub mod value;

pub use budget::{Budget, BudgetBreach, BudgetReport};
pub use builder::{decode, Decoded};
pub use catalogue::{unity_tag, Catalogue, UNITY_TAG_PREFIX};
pub use component_list::ComponentList;
pub use error::{Error, Location};
pub use events::{Event, Events, ReplayEvents};
pub use live_events::{strip_header_suffixes, LiveEvents};
pub use loader::{load, Scene, SceneObject, UnknownTagTally};
pub use options::Options;
pub use resolve::{Deferred, DeferredValue, Resolver, WriteTarget};
pub use schema::{Decodable, ObjectKind, Property, PropertyDescriptor, TypeDescriptor, UnityObject};
pub use value::{
    Color, FileRef, FromValue, Node, ObjectRef, Quaternion, Rect, Value, ValueKind, ValueMismatch,
    Vector3,
};

/// Load a scene from YAML text with default [`Options`].
pub fn from_str(input: &str, catalogue: &Catalogue) -> Result<Scene, Error> {
    from_str_with_options(input, catalogue, Options::default())
}

/// Load a scene from YAML text.
///
/// Unity's `stripped` document header suffix is removed before parsing. The
/// optional [`Options::budget_report`] callback receives the final counters
/// whether or not the load succeeds.
pub fn from_str_with_options(
    input: &str,
    catalogue: &Catalogue,
    options: Options,
) -> Result<Scene, Error> {
    let input = strip_header_suffixes(input);
    let mut events = LiveEvents::new(&input, options.budget.clone());
    let result = load(&mut events, catalogue, &options);
    if let (Some(callback), Some(report)) = (options.budget_report, events.budget_report()) {
        callback(&report);
    }
    let scene = result?;
    events.finish()?;
    Ok(scene)
}

/// Load a scene from UTF-8 bytes.
pub fn from_slice_with_options(
    bytes: &[u8],
    catalogue: &Catalogue,
    options: Options,
) -> Result<Scene, Error> {
    let input = std::str::from_utf8(bytes).map_err(|e| Error::msg(format!("input is not valid UTF-8: {e}")))?;
    from_str_with_options(input, catalogue, options)
}

/// Read the whole of `reader` and load it as a scene.
pub fn from_reader<R: Read>(mut reader: R, catalogue: &Catalogue, options: Options) -> Result<Scene, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice_with_options(&bytes, catalogue, options)
}
