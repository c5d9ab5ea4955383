//! Related-entity queries.
//!
//! One query per entity kind, each with its own fixed set of link fields. All
//! of them follow the same contract:
//! - forward links (ids stored on the subject) come first, in field order
//! - reverse links (other records pointing at the subject) follow
//! - results are unique by `(kind, id)`, first occurrence wins
//! - ids that do not resolve are dropped
//!
//! When the subject itself is not in the snapshot, only reverse links are
//! reported.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use signal_model::{Entity, EntityKind, Workspace};

use crate::resolve::{link_is, links_to, resolve, resolve_one};

/// A record related to the subject of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    pub kind: EntityKind,
    pub id: String,
    pub title: String,
}

impl RelatedEntity {
    fn of<T: Entity>(item: &T) -> Self {
        Self {
            kind: T::KIND,
            id: item.id().to_string(),
            title: item.label().to_string(),
        }
    }
}

/// Ordered, de-duplicated accumulator.
#[derive(Default)]
struct RelatedSet {
    seen: HashSet<(EntityKind, String)>,
    items: Vec<RelatedEntity>,
}

impl RelatedSet {
    fn push<T: Entity>(&mut self, item: &T) {
        if self.seen.insert((T::KIND, item.id().to_string())) {
            self.items.push(RelatedEntity::of(item));
        }
    }

    fn extend<'a, T: Entity + 'a>(&mut self, items: impl IntoIterator<Item = &'a T>) {
        for item in items {
            self.push(item);
        }
    }

    fn optional<T: Entity>(&mut self, pool: &[T], link: &Option<String>) {
        if let Some(item) = link.as_deref().and_then(|id| resolve_one(pool, id)) {
            self.push(item);
        }
    }

    fn finish(self) -> Vec<RelatedEntity> {
        self.items
    }
}

/// Entities related to `(kind, id)`.
pub fn related(workspace: &Workspace, kind: EntityKind, id: &str) -> Vec<RelatedEntity> {
    match kind {
        EntityKind::FocusArea => related_to_focus_area(workspace, id),
        EntityKind::Archetype => related_to_archetype(workspace, id),
        EntityKind::Hypothesis => related_to_hypothesis(workspace, id),
        EntityKind::Idea => related_to_idea(workspace, id),
        EntityKind::JourneyMap => related_to_journey_map(workspace, id),
        EntityKind::Decision => related_to_decision(workspace, id),
        EntityKind::Objective => related_to_objective(workspace, id),
        EntityKind::Document => related_to_document(workspace, id),
        EntityKind::Changelog => related_to_changelog(workspace, id),
        EntityKind::Blocker => related_to_blocker(workspace, id),
    }
}

pub fn related_to_focus_area(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(focus) = resolve_one(&ws.focus_areas, id) {
        set.extend(resolve(&ws.archetypes, &focus.target_archetype_ids));
    }

    set.extend(
        ws.archetypes
            .iter()
            .filter(|a| links_to(&a.related_focus_area_ids, id)),
    );
    set.extend(ws.hypotheses.iter().filter(|h| link_is(&h.focus_area_id, id)));
    set.extend(ws.ideas.iter().filter(|i| link_is(&i.focus_area_id, id)));
    set.extend(ws.decisions.iter().filter(|d| link_is(&d.focus_area_id, id)));
    set.extend(ws.objectives.iter().filter(|o| links_to(&o.focus_area_ids, id)));
    set.extend(ws.documents.iter().filter(|d| links_to(&d.focus_area_ids, id)));
    set.extend(ws.changelog.iter().filter(|c| link_is(&c.focus_area_id, id)));
    set.extend(ws.blockers.iter().filter(|b| link_is(&b.focus_area_id, id)));

    set.finish()
}

pub fn related_to_archetype(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(archetype) = resolve_one(&ws.archetypes, id) {
        set.extend(resolve(&ws.focus_areas, &archetype.related_focus_area_ids));
    }

    set.extend(
        ws.focus_areas
            .iter()
            .filter(|f| links_to(&f.target_archetype_ids, id)),
    );
    set.extend(ws.hypotheses.iter().filter(|h| link_is(&h.archetype_id, id)));
    set.extend(ws.ideas.iter().filter(|i| link_is(&i.target_archetype_id, id)));
    set.extend(ws.journey_maps.iter().filter(|j| link_is(&j.archetype_id, id)));
    set.extend(ws.documents.iter().filter(|d| links_to(&d.archetype_ids, id)));

    set.finish()
}

pub fn related_to_hypothesis(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(hypothesis) = resolve_one(&ws.hypotheses, id) {
        set.optional(&ws.focus_areas, &hypothesis.focus_area_id);
        set.optional(&ws.archetypes, &hypothesis.archetype_id);
    }

    set.extend(
        ws.decisions
            .iter()
            .filter(|d| links_to(&d.related_hypothesis_ids, id)),
    );
    set.extend(
        ws.changelog
            .iter()
            .filter(|c| links_to(&c.validated_hypothesis_ids, id)),
    );

    set.finish()
}

pub fn related_to_idea(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(idea) = resolve_one(&ws.ideas, id) {
        set.optional(&ws.focus_areas, &idea.focus_area_id);
        set.optional(&ws.archetypes, &idea.target_archetype_id);
    }

    set.extend(ws.journey_maps.iter().filter(|j| link_is(&j.idea_id, id)));

    set.finish()
}

pub fn related_to_journey_map(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(map) = resolve_one(&ws.journey_maps, id) {
        set.optional(&ws.ideas, &map.idea_id);
        set.optional(&ws.archetypes, &map.archetype_id);
    }

    set.finish()
}

pub fn related_to_decision(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(decision) = resolve_one(&ws.decisions, id) {
        set.optional(&ws.focus_areas, &decision.focus_area_id);
        set.extend(resolve(&ws.hypotheses, &decision.related_hypothesis_ids));
    }

    set.finish()
}

pub fn related_to_objective(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(objective) = resolve_one(&ws.objectives, id) {
        set.extend(resolve(&ws.focus_areas, &objective.focus_area_ids));
    }

    set.finish()
}

pub fn related_to_document(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(document) = resolve_one(&ws.documents, id) {
        set.extend(resolve(&ws.archetypes, &document.archetype_ids));
        set.extend(resolve(&ws.focus_areas, &document.focus_area_ids));
    }

    set.finish()
}

pub fn related_to_changelog(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(entry) = resolve_one(&ws.changelog, id) {
        set.optional(&ws.focus_areas, &entry.focus_area_id);
        set.extend(resolve(&ws.hypotheses, &entry.validated_hypothesis_ids));
    }

    set.finish()
}

pub fn related_to_blocker(ws: &Workspace, id: &str) -> Vec<RelatedEntity> {
    let mut set = RelatedSet::default();

    if let Some(blocker) = resolve_one(&ws.blockers, id) {
        set.optional(&ws.focus_areas, &blocker.focus_area_id);
    }

    set.finish()
}
