use crate::arena::{Entry, TypedArena};

/// What a node carries. Only the level-0 node of a tower owns the element; the copies stacked
/// above it refer back to that node.
pub enum Payload<T> {
    Sentinel,
    Element(T),
    Copy(Entry),
}

pub struct Node<T> {
    pub payload: Payload<T>,
    pub next: Option<Entry>,
    pub prev: Option<Entry>,
    pub above: Option<Entry>,
    pub below: Option<Entry>,
}

impl<T> Node<T> {
    fn new(payload: Payload<T>) -> Self {
        Node {
            payload,
            next: None,
            prev: None,
            above: None,
            below: None,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(Payload::Sentinel)
    }

    pub fn element(value: T) -> Self {
        Self::new(Payload::Element(value))
    }

    pub fn copy_of(base: Entry) -> Self {
        Self::new(Payload::Copy(base))
    }
}

/// The head and tail sentinels bounding one level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frame {
    pub head: Entry,
    pub tail: Entry,
}

impl Frame {
    /// Allocates a linked pair of sentinels with nothing between them.
    pub fn allocate<T>(nodes: &mut TypedArena<Node<T>>) -> Self {
        let head = nodes.allocate(Node::sentinel());
        let tail = nodes.allocate(Node::sentinel());
        nodes[head].next = Some(tail);
        nodes[tail].prev = Some(head);
        Frame { head, tail }
    }

    pub fn is_empty<T>(&self, nodes: &TypedArena<Node<T>>) -> bool {
        nodes[self.head].next == Some(self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, Node, Payload};
    use crate::arena::TypedArena;

    #[test]
    fn test_frame_allocate() {
        let mut nodes: TypedArena<Node<u32>> = TypedArena::new();
        let frame = Frame::allocate(&mut nodes);

        assert!(frame.is_empty(&nodes));
        assert!(matches!(nodes[frame.head].payload, Payload::Sentinel));
        assert!(matches!(nodes[frame.tail].payload, Payload::Sentinel));
        assert_eq!(nodes[frame.head].prev, None);
        assert_eq!(nodes[frame.tail].next, None);
        assert_eq!(nodes[frame.tail].prev, Some(frame.head));
    }

    #[test]
    fn test_frame_not_empty() {
        let mut nodes = TypedArena::new();
        let frame = Frame::allocate(&mut nodes);
        let node = nodes.allocate(Node::element(1));
        nodes[frame.head].next = Some(node);
        nodes[node].prev = Some(frame.head);
        nodes[node].next = Some(frame.tail);
        nodes[frame.tail].prev = Some(node);

        assert!(!frame.is_empty(&nodes));
        match nodes[node].payload {
            Payload::Element(value) => assert_eq!(value, 1),
            _ => panic!("Expected an element node."),
        }
    }
}
