//! Document stream loader.
//!
//! Walks the stream one document at a time. A document whose root tag is
//! registered is decoded by the builder; any other document is consumed
//! whole and counted in the [`UnknownTagTally`]. Unknown tags are expected
//! and common, decoding failures are not: the first one ends the load.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::catalogue::Catalogue;
use crate::error::Error;
use crate::events::{expect_document_end, expect_stream_start, next_event, skip_node, Event, Events};
use crate::options::{Cfg, Options};
use crate::resolve::{Resolver, WriteTarget};
use crate::schema::{Decodable, UnityObject};
use crate::value::ObjectRef;

/// One decoded document.
#[derive(Debug)]
pub struct SceneObject {
    /// Zero-based position of the document in the stream.
    pub document: usize,
    pub tag: Option<String>,
    /// Anchor label of the root node (`&400` gives `"400"`).
    pub anchor: Option<String>,
    /// The anchor read as an integer: the id other objects use in `{fileID: N}`.
    pub file_id: Option<i64>,
    pub object: Box<dyn UnityObject>,
}

impl SceneObject {
    pub fn class_name(&self) -> &'static str {
        self.object.class_name()
    }

    pub fn downcast_ref<T: Decodable>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }
}

/// Count of skipped documents per tag, ordered by tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnknownTagTally {
    counts: BTreeMap<String, usize>,
}

impl UnknownTagTally {
    pub fn record(&mut self, tag: &str) {
        *self.counts.entry(tag.to_owned()).or_insert(0) += 1;
    }

    pub fn count(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(tag, n)| (tag.as_str(), *n))
    }

    /// Number of distinct unknown tags.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of skipped documents.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for UnknownTagTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, n) in &self.counts {
            writeln!(f, "Skipped unknown tag {tag} {n} time(s)")?;
        }
        Ok(())
    }
}

/// Result of a load.
#[derive(Debug, Default)]
pub struct Scene {
    /// Decoded documents in stream order.
    pub objects: Vec<SceneObject>,
    pub unknown_tags: UnknownTagTally,
    /// Reference writes whose file id matched no decoded document. Their
    /// fields keep the default [`ObjectRef`].
    pub unresolved_references: usize,
}

impl Scene {
    /// All decoded instances of `T`, in stream order.
    pub fn of_type<T: Decodable>(&self) -> impl Iterator<Item = &T> + '_ {
        self.objects.iter().filter_map(SceneObject::downcast_ref::<T>)
    }

    pub fn by_file_id(&self, file_id: i64) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.file_id == Some(file_id))
    }

    /// Follow a resolved reference.
    pub fn get(&self, reference: &ObjectRef) -> Option<&SceneObject> {
        self.objects.get(reference.target?)
    }
}

/// Load every document of the stream.
///
/// Errors raised inside a document are wrapped in [`Error::Document`] with the
/// document index and root tag.
pub fn load(ev: &mut dyn Events, catalogue: &Catalogue, options: &Options) -> Result<Scene, Error> {
    let cfg = Cfg::from_options(options);
    let mut scene = Scene::default();
    let mut resolver = Resolver::new();

    expect_stream_start(ev)?;
    let mut index = 0usize;
    loop {
        match next_event(ev)? {
            Event::StreamEnd { .. } => break,
            Event::DocumentStart { .. } => {}
            other => {
                return Err(Error::structural("document start", other.describe())
                    .with_location(other.location()));
            }
        }
        load_document(ev, index, catalogue, cfg, &mut scene, &mut resolver)?;
        index += 1;
    }

    scene.unresolved_references = if options.resolve_references {
        resolver.resolve_all(&mut scene.objects)?
    } else {
        resolver.pending()
    };

    info!(
        documents = index,
        decoded = scene.objects.len(),
        skipped = scene.unknown_tags.total(),
        unresolved = scene.unresolved_references,
        "scene loaded"
    );
    Ok(scene)
}

fn load_document(
    ev: &mut dyn Events,
    index: usize,
    catalogue: &Catalogue,
    cfg: Cfg,
    scene: &mut Scene,
    resolver: &mut Resolver,
) -> Result<(), Error> {
    let (tag, anchor) = match ev.peek()? {
        Some(Event::DocumentEnd { .. }) => {
            expect_document_end(ev)?;
            debug!(document = index, "empty document");
            return Ok(());
        }
        Some(root) => (root.tag().map(str::to_owned), root.anchor().map(str::to_owned)),
        None => return Err(Error::eof().with_event_location(ev).in_document(index, None)),
    };
    let tag_name = tag.as_deref().unwrap_or("");

    let Some(descriptor) = catalogue.resolve(tag_name) else {
        skip_node(ev)
            .and_then(|_| expect_document_end(ev))
            .map_err(|e| e.in_document(index, tag.clone()))?;
        debug!(document = index, tag = tag_name, "skipped document with unknown tag");
        scene.unknown_tags.record(tag_name);
        return Ok(());
    };

    let decoded = descriptor
        .decode(ev, cfg)
        .and_then(|decoded| match decoded {
            Some(decoded) => Ok(decoded),
            None => {
                let (found, location) = match ev.peek()? {
                    Some(event) => (event.describe(), event.location()),
                    None => ("end of input".to_owned(), ev.last_location()),
                };
                Err(Error::structural("mapping start", found).with_location(location))
            }
        })
        .and_then(|decoded| expect_document_end(ev).map(|_| decoded))
        .map_err(|e| e.in_document(index, tag.clone()))?;

    let object = scene.objects.len();
    for deferred in decoded.deferred {
        resolver.deferred(deferred.key).subscribe(WriteTarget {
            object,
            path: deferred.path,
            property: deferred.property,
        });
    }

    debug!(
        document = index,
        tag = tag_name,
        class = descriptor.name(),
        anchor = anchor.as_deref().unwrap_or(""),
        "decoded document"
    );
    let file_id = anchor.as_deref().and_then(|a| a.parse::<i64>().ok());
    scene.objects.push(SceneObject {
        document: index,
        tag,
        anchor,
        file_id,
        object: decoded.object,
    });
    Ok(())
}
