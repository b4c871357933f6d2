//! Pure clustering decisions.
//!
//! Every function here is deterministic: the caller supplies the candidate
//! streams, the current time and the id a new event would get, and receives
//! a [`Decision`] plus the [`Effect`]s that realise it. No store access, no
//! clock, no randomness.

use geocast_geo::distance;
use geocast_types::{Event, EventId, GeoPoint, Stream, StreamId, Timestamp};

use crate::effects::Effect;

/// What clustering decided for a newly created stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No co-located neighbor; the stream stays unassigned.
    Standalone,
    /// The stream joins an event one of its neighbors already belongs to.
    Join { event_id: EventId },
    /// A new event was formed from the stream and all of its neighbors.
    Create {
        event_id: EventId,
        participants: Vec<StreamId>,
    },
}

impl Decision {
    /// The event the stream ends up in, if any.
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Decision::Standalone => None,
            Decision::Join { event_id } | Decision::Create { event_id, .. } => Some(*event_id),
        }
    }
}

/// Centroid and member count derived from a set of live streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub centroid: GeoPoint,
    pub stream_count: u64,
}

/// Keeps the candidates whose exact great-circle distance to `stream` is at
/// most `join_radius_m`, preserving arrival order.
///
/// The stream itself is never its own neighbor.
pub fn select_neighbors(stream: &Stream, candidates: Vec<Stream>, join_radius_m: f64) -> Vec<Stream> {
    candidates
        .into_iter()
        .filter(|c| c.id != stream.id && distance(stream.location, c.location) <= join_radius_m)
        .collect()
}

/// Decides how `stream` joins or forms an event given its `neighbors`.
///
/// - If any neighbor carries an event id, the first such neighbor (in
///   arrival order) wins and the stream joins that event.
/// - Otherwise, if there is at least one neighbor, a new event with id
///   `new_event_id` is formed from the stream plus every neighbor. Its
///   centroid is the arithmetic mean of the participants' true locations.
/// - With no neighbors the stream stays standalone.
///
/// When the stream was previously attached to a different event (a
/// concurrent clustering pass pulled it in), that event's aggregate is
/// recomputed as well so it never keeps a stale member.
pub fn plan_assignment(
    stream: &Stream,
    neighbors: &[Stream],
    new_event_id: EventId,
    now: Timestamp,
    event_radius_m: u32,
) -> (Decision, Vec<Effect>) {
    let (decision, mut effects) = if let Some(event_id) = neighbors.iter().find_map(|n| n.event_id) {
        let effects = vec![
            Effect::AssignEvent {
                stream_ids: vec![stream.id],
                event_id,
            },
            Effect::RecomputeAggregate { event_id, at: now },
        ];
        (Decision::Join { event_id }, effects)
    } else if neighbors.is_empty() {
        (Decision::Standalone, Vec::new())
    } else {
        let participants: Vec<StreamId> = std::iter::once(stream.id)
            .chain(neighbors.iter().map(|n| n.id))
            .collect();
        let locations: Vec<GeoPoint> = std::iter::once(stream.location)
            .chain(neighbors.iter().map(|n| n.location))
            .collect();
        let centroid = GeoPoint::mean(&locations).unwrap_or(stream.location);

        let mut event = Event::new(new_event_id, centroid, participants.len() as u64, now);
        event.radius_meters = event_radius_m;

        let effects = vec![
            Effect::EventInsert(event),
            Effect::AssignEvent {
                stream_ids: participants.clone(),
                event_id: new_event_id,
            },
        ];
        (
            Decision::Create {
                event_id: new_event_id,
                participants,
            },
            effects,
        )
    };

    if let (Some(previous), Some(target)) = (stream.event_id, decision.event_id())
        && previous != target
    {
        effects.push(Effect::RecomputeAggregate {
            event_id: previous,
            at: now,
        });
    }

    debug_assert!(
        matches!(decision, Decision::Standalone) == effects.is_empty(),
        "only a standalone decision produces no effects"
    );

    (decision, effects)
}

/// Derives an event's aggregate from its live members.
///
/// Returns `None` when there are no members; the event must then be ended
/// rather than left live with a zero count.
pub fn aggregate(members: &[Stream]) -> Option<Aggregate> {
    let centroid = GeoPoint::mean(members.iter().map(|s| &s.location))?;
    Some(Aggregate {
        centroid,
        stream_count: members.len() as u64,
    })
}

/// Decides what happens to an event after one of its members ended.
///
/// `live_members` is the number of members still live after the transition.
/// The last member leaving ends the event; otherwise the aggregate is
/// recomputed over the remaining members.
pub fn plan_after_end(event_id: EventId, live_members: usize, now: Timestamp) -> Effect {
    if live_members == 0 {
        Effect::EndEvent { event_id, at: now }
    } else {
        Effect::RecomputeAggregate { event_id, at: now }
    }
}
