//! Child attachment points
//!
//! A child attachment point is a socket where the runtime mounts a dependent
//! model. The header stores it as one position-buffer index shared by every
//! frame, so each point must resolve to an index that holds the point's
//! position in all frames at once.

use super::buffers::{BufferTables, MAX_POSITIONS};
use super::error::ModelError;

/// Header slots available for child vertices
pub const MAX_CHILD_ATTACHMENTS: usize = 4;

/// Header value of an unused child vertex slot
pub const NO_CHILD_VERTEX: u8 = 0xFF;

/// Socket position, one entry per animation frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildAttachment {
    positions: Vec<[i16; 3]>,
}

impl ChildAttachment {
    /// Point that moves with the animation
    pub fn per_frame(positions: Vec<[i16; 3]>) -> Self {
        Self { positions }
    }

    /// Point that stays put in every one of `frame_count` frames
    pub fn fixed(position: [i16; 3], frame_count: usize) -> Self {
        Self {
            positions: vec![position; frame_count],
        }
    }

    pub fn positions(&self) -> &[[i16; 3]] {
        &self.positions
    }
}

/// Resolve every attachment to a shared position index
///
/// Only the last frame-0 position equal to the attachment is considered, so
/// recently appended vertices (earlier attachments) are reused before
/// unrelated geometry. It is accepted only if every frame holds its own
/// attachment position at that index; otherwise the point is appended to all
/// frames at one new index.
pub fn resolve_child_vertices(
    tables: &mut BufferTables,
    attachments: &[ChildAttachment],
) -> Result<[u8; MAX_CHILD_ATTACHMENTS], ModelError> {
    if attachments.len() > MAX_CHILD_ATTACHMENTS {
        return Err(ModelError::TooManyAttachments {
            limit: MAX_CHILD_ATTACHMENTS,
        });
    }

    let frame_count = tables.frame_count();
    let mut resolved = [NO_CHILD_VERTEX; MAX_CHILD_ATTACHMENTS];

    for (slot, attachment) in attachments.iter().enumerate() {
        if attachment.positions.len() != frame_count {
            return Err(ModelError::AttachmentFrameMismatch {
                got: attachment.positions.len(),
                frames: frame_count,
            });
        }
        if frame_count == 0 {
            return Err(ModelError::NoFrames);
        }

        let index = match find_shared_index(tables, attachment)? {
            Some(index) => index,
            None => append_shared(tables, attachment)?,
        };
        tracing::debug!("child vertex {} resolved to position {}", slot, index);
        resolved[slot] = index as u8;
    }

    Ok(resolved)
}

/// Latest frame-0 match, if every other frame agrees at that index
fn find_shared_index(
    tables: &BufferTables,
    attachment: &ChildAttachment,
) -> Result<Option<usize>, ModelError> {
    let wanted = attachment.positions[0];
    let Some(index) = tables
        .positions_of(0)?
        .as_slice()
        .iter()
        .rposition(|&p| p == wanted)
    else {
        return Ok(None);
    };

    for (frame, &position) in attachment.positions.iter().enumerate().skip(1) {
        if tables.positions_of(frame)?.get(index) != Some(position) {
            return Ok(None);
        }
    }
    Ok(Some(index))
}

fn append_shared(
    tables: &mut BufferTables,
    attachment: &ChildAttachment,
) -> Result<usize, ModelError> {
    let frame_count = tables.frame_count();

    // Check every frame first so a failure leaves all buffers untouched
    for frame in 0..frame_count {
        let requested = tables.positions_of(frame)?.len() + 1;
        if requested > MAX_POSITIONS {
            return Err(ModelError::Capacity {
                requested,
                limit: MAX_POSITIONS,
            });
        }
    }

    let mut index = None;
    for (frame, &position) in attachment.positions.iter().enumerate() {
        let appended = tables.positions_of_mut(frame)?.push(position);
        debug_assert!(index.is_none() || index == Some(appended));
        index = Some(appended);
    }
    index.ok_or(ModelError::NoFrames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(frames: usize, positions: &[[i16; 3]]) -> BufferTables {
        let mut tables = BufferTables::default();
        tables.allocate_frames(frames, positions.len(), 0, 0).unwrap();
        for frame in 0..frames {
            let buffer = tables.positions_of_mut(frame).unwrap();
            for (i, &p) in positions.iter().enumerate() {
                buffer.set(i, p).unwrap();
            }
        }
        tables
    }

    #[test]
    fn test_reuses_existing_vertex() {
        let mut tables = tables(2, &[[0, 0, 0], [5, 5, 5], [9, 9, 9]]);
        let resolved =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([5, 5, 5], 2)]).unwrap();
        assert_eq!(resolved, [1, NO_CHILD_VERTEX, NO_CHILD_VERTEX, NO_CHILD_VERTEX]);
        assert_eq!(tables.positions_of(0).unwrap().len(), 3);
    }

    #[test]
    fn test_prefers_latest_match() {
        let mut tables = tables(1, &[[1, 1, 1], [2, 2, 2], [1, 1, 1]]);
        let resolved =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([1, 1, 1], 1)]).unwrap();
        assert_eq!(resolved[0], 2);
    }

    #[test]
    fn test_appends_when_frames_disagree() {
        let mut tables = tables(2, &[[7, 7, 7]]);
        tables.positions_of_mut(1).unwrap().set(0, [8, 8, 8]).unwrap();

        let resolved =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([7, 7, 7], 2)]).unwrap();
        assert_eq!(resolved[0], 1);
        for frame in 0..2 {
            let buffer = tables.positions_of(frame).unwrap();
            assert_eq!(buffer.len(), 2);
            assert_eq!(buffer.get(1), Some([7, 7, 7]));
        }
    }

    #[test]
    fn test_only_latest_match_is_considered() {
        // Index 0 agrees in both frames, but the latest match (index 1) does not
        let mut tables = tables(2, &[[6, 6, 6], [6, 6, 6]]);
        tables.positions_of_mut(1).unwrap().set(1, [9, 9, 9]).unwrap();

        let resolved =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([6, 6, 6], 2)]).unwrap();
        assert_eq!(resolved[0], 2);
        for frame in 0..2 {
            let buffer = tables.positions_of(frame).unwrap();
            assert_eq!(buffer.len(), 3);
            assert_eq!(buffer.get(2), Some([6, 6, 6]));
        }
    }

    #[test]
    fn test_moving_attachment_matches_per_frame() {
        let mut tables = tables(2, &[[0, 0, 0], [3, 3, 3]]);
        tables.positions_of_mut(1).unwrap().set(1, [4, 4, 4]).unwrap();

        let attachment = ChildAttachment::per_frame(vec![[3, 3, 3], [4, 4, 4]]);
        let resolved = resolve_child_vertices(&mut tables, &[attachment]).unwrap();
        assert_eq!(resolved[0], 1);
        assert_eq!(tables.positions_of(1).unwrap().len(), 2);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut tables = tables(3, &[[0, 0, 0]]);
        let attachments = [
            ChildAttachment::fixed([10, 0, 0], 3),
            ChildAttachment::fixed([0, 10, 0], 3),
        ];

        let first = resolve_child_vertices(&mut tables, &attachments).unwrap();
        let len_after_first = tables.positions_of(0).unwrap().len();
        let second = resolve_child_vertices(&mut tables, &attachments).unwrap();

        assert_eq!(first, second);
        assert_eq!(first[..2], [1, 2]);
        for frame in 0..3 {
            assert_eq!(tables.positions_of(frame).unwrap().len(), len_after_first);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        let mut tables = BufferTables::default();
        tables.allocate_frames(2, MAX_POSITIONS, 0, 0).unwrap();

        let result =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([1, 2, 3], 2)]);
        assert_eq!(
            result,
            Err(ModelError::Capacity {
                requested: 257,
                limit: MAX_POSITIONS
            })
        );
        assert_eq!(tables.positions_of(0).unwrap().len(), MAX_POSITIONS);
        assert_eq!(tables.positions_of(1).unwrap().len(), MAX_POSITIONS);
    }

    #[test]
    fn test_full_buffer_can_still_reuse() {
        let mut tables = BufferTables::default();
        tables.allocate_frames(1, MAX_POSITIONS, 0, 0).unwrap();
        let resolved =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([0, 0, 0], 1)]).unwrap();
        assert_eq!(resolved[0], 255);
    }

    #[test]
    fn test_attachment_needs_one_position_per_frame() {
        let mut tables = tables(2, &[[0, 0, 0]]);
        let result =
            resolve_child_vertices(&mut tables, &[ChildAttachment::fixed([0, 0, 0], 1)]);
        assert_eq!(
            result,
            Err(ModelError::AttachmentFrameMismatch { got: 1, frames: 2 })
        );
    }

    #[test]
    fn test_too_many_attachments() {
        let mut tables = tables(1, &[[0, 0, 0]]);
        let attachments = vec![ChildAttachment::fixed([0, 0, 0], 1); 5];
        assert_eq!(
            resolve_child_vertices(&mut tables, &attachments),
            Err(ModelError::TooManyAttachments { limit: 4 })
        );
    }
}
