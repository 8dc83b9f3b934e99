/// Integer point in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned rectangle on the pixel grid.
///
/// `w`/`h` are never negative once a view has been laid out; before that a
/// rect may transiently be `0 x 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// A rect with both sides zero; it never contributes to a union.
    pub fn is_empty(&self) -> bool {
        self.w == 0 && self.h == 0
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn resize(&mut self, w: i32, h: i32) {
        self.w = w;
        self.h = h;
    }

    /// Grow to the bounding box of `self` and `other`.
    ///
    /// An empty `other` is ignored; an empty `self` adopts `other` as is.
    /// Edges only ever move outwards.
    pub fn union_with(&mut self, other: &Rect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        self.x = self.x.min(other.x);
        self.y = self.y.min(other.y);
        self.w = right - self.x;
        self.h = bottom - self.y;
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Overlap of two rects, `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= x || b <= y {
            None
        } else {
            Some(Rect::new(x, y, r - x, b - y))
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Four edge distances, used both for view paddings and for effect insets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(v: i32) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Per-edge maximum of two insets.
    pub fn max(&self, other: &Insets) -> Insets {
        Insets::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Per-edge minimum of two insets.
    pub fn min(&self, other: &Insets) -> Insets {
        Insets::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }
}
