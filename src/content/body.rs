//! "Also Read" interleaving for the public reader

use super::ContentBlock;

/// Block counts after which an "Also Read" box is placed
pub const ALSO_READ_AFTER: [usize; 2] = [3, 6];

/// Related items shown in each box
pub const ALSO_READ_PER_BOX: usize = 2;

/// An item of a rendered article body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem<'a, R> {
    Block(ContentBlock),
    AlsoRead(&'a [R]),
}

/// Places "Also Read" boxes after the 3rd and 6th blocks
///
/// The first box shows the first two related items, the second box the next
/// two. A box is skipped when it would be empty or when the body is too short
/// to reach its position.
pub fn interleave<'a, R>(
    blocks: impl IntoIterator<Item = ContentBlock>,
    related: &'a [R],
) -> Vec<BodyItem<'a, R>> {
    let mut items = Vec::new();
    let mut boxes = related.chunks(ALSO_READ_PER_BOX);

    for (index, block) in blocks.into_iter().enumerate() {
        items.push(BodyItem::Block(block));
        if ALSO_READ_AFTER.contains(&(index + 1)) {
            if let Some(chunk) = boxes.next() {
                items.push(BodyItem::AlsoRead(chunk));
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{blocks, TransformOptions};

    fn body(paragraphs: usize) -> String {
        (1..=paragraphs)
            .map(|n| format!("Paragraph {}", n))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn positions<R>(items: &[BodyItem<'_, R>]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches!(item, BodyItem::AlsoRead(_)))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_boxes_after_third_and_sixth_blocks() {
        let related = ["a", "b", "c", "d"];
        let text = body(8);
        let items = interleave(blocks(&text, TransformOptions::reader()), &related);

        assert_eq!(items.len(), 10);
        assert_eq!(positions(&items), vec![3, 7]);
        assert_eq!(items[3], BodyItem::AlsoRead(&related[0..2]));
        assert_eq!(items[7], BodyItem::AlsoRead(&related[2..4]));
    }

    #[test]
    fn test_short_body_gets_one_box() {
        let related = ["a", "b", "c"];
        let text = body(4);
        let items = interleave(blocks(&text, TransformOptions::reader()), &related);
        assert_eq!(positions(&items), vec![3]);
    }

    #[test]
    fn test_no_related_no_boxes() {
        let related: [&str; 0] = [];
        let text = body(7);
        let items = interleave(blocks(&text, TransformOptions::reader()), &related);
        assert!(positions(&items).is_empty());
        assert_eq!(items.len(), 7);
    }

    #[test]
    fn test_second_box_skipped_when_related_runs_out() {
        let related = ["a"];
        let text = body(7);
        let items = interleave(blocks(&text, TransformOptions::reader()), &related);
        assert_eq!(positions(&items), vec![3]);
    }
}
