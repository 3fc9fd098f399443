use core::{cmp::Reverse, mem, ops::Range};

use crate::{
    escape::{UnescapedRef, UnescapedRoute},
    params::Params,
    BytesStr, InsertError, MatchError, Vec,
};

/// What a node's prefix represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A run of literal bytes.
    Static,
    /// A single path segment bound to a name, `{name}`.
    Param,
    /// The remainder of the path bound to a name, `{*name}`. Always a leaf.
    CatchAll,
}

/// A node of the route tree.
///
/// A node has either any number of [`Static`](NodeKind::Static) children plus at
/// most one wildcard child (`Param` or `CatchAll`), or — for a `CatchAll` node —
/// no children at all.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) prefix: UnescapedRoute,
    kind: NodeKind,
    /// Precomputed parameter name for `Param`/`CatchAll` nodes, cheap to clone into
    /// every match's `Params` list without re-allocating or re-validating UTF-8.
    name: BytesStr,
    value: Option<T>,
    priority: u32,
    indices: Vec<u8>,
    children: Vec<Node<T>>,
    wildcard: Option<alloc::boxed::Box<Node<T>>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    pub(crate) const fn new() -> Self {
        Self {
            prefix: UnescapedRoute::empty(),
            kind: NodeKind::Static,
            name: BytesStr::from_static(""),
            value: None,
            priority: 0,
            indices: Vec::new(),
            children: Vec::new(),
            wildcard: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.prefix.unescaped().is_empty()
            && self.value.is_none()
            && self.children.is_empty()
            && self.wildcard.is_none()
    }

    fn is_prunable(&self) -> bool {
        self.value.is_none() && self.children.is_empty() && self.wildcard.is_none()
    }

    pub(crate) fn first_child(&self) -> Option<&Node<T>> {
        self.children.first().or(self.wildcard.as_deref())
    }

    // --- insertion -----------------------------------------------------

    pub(crate) fn insert(&mut self, full: UnescapedRoute, val: T) -> Result<(), InsertError> {
        if self.is_empty() {
            self.fill(full.as_ref(), &full, val)?;
        } else {
            self.insert_matching(full.as_ref(), &full, val)?;
        }
        self.recompute_priority();
        Ok(())
    }

    /// Matches `remaining` against `self.prefix` (splitting `self` if only part of
    /// the prefix matches) and continues the insert from there.
    fn insert_matching(&mut self, remaining: UnescapedRef<'_>, full: &UnescapedRoute, val: T) -> Result<(), InsertError> {
        let cp = common_prefix_len(self.prefix.unescaped(), remaining.unescaped());

        if cp < self.prefix.unescaped().len() {
            self.split_at(cp);
        }

        self.insert_after_prefix(remaining.slice_off(cp), full, val)
    }

    /// `self`'s own prefix has already been matched (or just created); handle
    /// whatever comes next: nothing (this is the value), a static child, or a
    /// wildcard child.
    fn insert_after_prefix(&mut self, remaining: UnescapedRef<'_>, full: &UnescapedRoute, val: T) -> Result<(), InsertError> {
        self.priority += 1;

        if remaining.unescaped().is_empty() {
            if self.value.is_some() {
                return Err(InsertError::conflict(full, remaining, self));
            }
            self.value = Some(val);
            return Ok(());
        }

        let next = remaining.unescaped()[0];

        if next == b'{' && !remaining.is_escaped(0) {
            return self.insert_wildcard(remaining, full, val);
        }

        if let Some(i) = self.indices.iter().position(|&b| b == next) {
            return self.children[i].insert_matching(remaining, full, val);
        }

        let mut child = Node::new();
        child.fill(remaining, full, val)?;
        self.indices.push(next);
        self.children.push(child);
        Ok(())
    }

    /// Fills a brand-new, empty node by consuming a static run (possibly empty)
    /// followed by whatever comes after it.
    fn fill(&mut self, remaining: UnescapedRef<'_>, full: &UnescapedRoute, val: T) -> Result<(), InsertError> {
        match find_wildcard(remaining)? {
            None => {
                self.prefix = remaining.to_owned();
                self.insert_after_prefix(remaining.slice_off(remaining.unescaped().len()), full, val)
            }
            Some(range) => {
                self.prefix = remaining.slice_until(range.start).to_owned();
                self.insert_after_prefix(remaining.slice_off(range.start), full, val)
            }
        }
    }

    /// `remaining` starts with an unescaped `{`. Parses the wildcard and creates or
    /// reuses this node's wildcard child.
    fn insert_wildcard(&mut self, remaining: UnescapedRef<'_>, full: &UnescapedRoute, val: T) -> Result<(), InsertError> {
        let (wlen, is_catch_all) = parse_wildcard_at_start(remaining)?;
        let wildcard_view = remaining.slice_until(wlen);
        let rest = remaining.slice_off(wlen);
        let name = param_name(wildcard_view.unescaped());

        if is_catch_all {
            if !rest.unescaped().is_empty() {
                return Err(InsertError::InvalidCatchAll);
            }

            return match &mut self.wildcard {
                Some(existing) if existing.kind == NodeKind::CatchAll && existing.prefix.unescaped() == wildcard_view.unescaped() => {
                    if existing.value.is_some() {
                        Err(InsertError::conflict(full, remaining, existing))
                    } else {
                        existing.value = Some(val);
                        existing.priority += 1;
                        Ok(())
                    }
                }
                Some(existing) => Err(InsertError::conflict(full, remaining, existing)),
                None => {
                    let mut child = Node::new();
                    child.kind = NodeKind::CatchAll;
                    child.prefix = wildcard_view.to_owned();
                    child.name = BytesStr::try_from(name).unwrap_or_default();
                    child.value = Some(val);
                    child.priority = 1;
                    self.wildcard = Some(alloc::boxed::Box::new(child));
                    Ok(())
                }
            };
        }

        if segment_has_second_wildcard(rest) {
            return Err(InsertError::InvalidParamSegment);
        }

        match &mut self.wildcard {
            Some(existing) if existing.kind == NodeKind::Param && existing.prefix.unescaped() == wildcard_view.unescaped() => {
                existing.insert_after_prefix(rest, full, val)
            }
            Some(existing) => Err(InsertError::conflict(full, remaining, existing)),
            None => {
                let mut child = Node::new();
                child.kind = NodeKind::Param;
                child.prefix = wildcard_view.to_owned();
                child.name = BytesStr::try_from(name).unwrap_or_default();
                child.insert_after_prefix(rest, full, val)?;
                self.wildcard = Some(alloc::boxed::Box::new(child));
                Ok(())
            }
        }
    }

    // splits self at byte offset `cp` of its own prefix: self keeps `prefix[..cp]`
    // and everything else (the rest of the prefix, value, children, wildcard)
    // moves into a new child.
    fn split_at(&mut self, cp: usize) {
        let tail = self.prefix.as_ref().slice_off(cp).to_owned();

        let child = Node {
            prefix: tail,
            kind: NodeKind::Static,
            name: BytesStr::from_static(""),
            value: self.value.take(),
            priority: 0,
            indices: mem::take(&mut self.indices),
            children: mem::take(&mut self.children),
            wildcard: self.wildcard.take(),
        };

        self.prefix.truncate(cp);
        self.indices = alloc::vec![child.prefix.unescaped()[0]];
        self.children = alloc::vec![child];
    }

    fn recompute_priority(&mut self) -> u32 {
        let mut total = self.value.is_some() as u32;

        for child in &mut self.children {
            total += child.recompute_priority();
        }
        if let Some(wildcard) = &mut self.wildcard {
            total += wildcard.recompute_priority();
        }
        self.priority = total;

        let mut order: Vec<usize> = (0..self.children.len()).collect();
        order.sort_by_key(|&i| Reverse(self.children[i].priority));

        if order.iter().enumerate().any(|(pos, &i)| pos != i) {
            let mut slots: Vec<Option<Node<T>>> = mem::take(&mut self.children).into_iter().map(Some).collect();
            let old_indices = mem::take(&mut self.indices);
            for &i in &order {
                self.children.push(slots[i].take().expect("each slot consumed once"));
                self.indices.push(old_indices[i]);
            }
        }

        total
    }

    /// Recomputes every node's priority from scratch and compares it against the
    /// stored value, returning `Err((stored, computed))` at the first mismatch.
    pub(crate) fn check_priorities(&self) -> Result<u32, (u32, u32)> {
        let mut computed = self.value.is_some() as u32;
        for child in &self.children {
            computed += child.check_priorities()?;
        }
        if let Some(wildcard) = &self.wildcard {
            computed += wildcard.check_priorities()?;
        }
        if computed != self.priority {
            return Err((self.priority, computed));
        }
        Ok(computed)
    }

    // --- removal ---------------------------------------------------------

    pub(crate) fn remove(&mut self, full: UnescapedRoute) -> Option<T> {
        let value = self.remove_matching(full.as_ref())?;
        self.recompute_priority();
        Some(value)
    }

    fn remove_matching(&mut self, remaining: UnescapedRef<'_>) -> Option<T> {
        let prefix = self.prefix.unescaped();
        if remaining.unescaped().len() < prefix.len() || &remaining.unescaped()[..prefix.len()] != prefix {
            return None;
        }
        let rest = remaining.slice_off(prefix.len());

        let value = if rest.unescaped().is_empty() {
            self.value.take()?
        } else {
            let next = rest.unescaped()[0];

            if next == b'{' && !rest.is_escaped(0) {
                // the wildcard child's own `prefix` is the `{name}`/`{*name}` text itself, so it
                // strips that text from `rest` the same way a static child strips its prefix —
                // no separate pre-parse needed here.
                let wildcard = self.wildcard.as_mut()?;
                let value = wildcard.remove_matching(rest)?;
                if wildcard.is_prunable() {
                    self.wildcard = None;
                }
                value
            } else {
                let i = self.indices.iter().position(|&b| b == next)?;
                let value = self.children[i].remove_matching(rest)?;
                if self.children[i].is_prunable() {
                    self.indices.remove(i);
                    self.children.remove(i);
                }
                value
            }
        };

        // a node with no value, no wildcard, and exactly one static child can be
        // re-merged with that child.
        if self.value.is_none() && self.wildcard.is_none() && self.children.len() == 1 {
            let child = self.children.pop().expect("length checked above");
            self.indices.clear();
            self.prefix.append(&child.prefix);
            self.kind = child.kind;
            self.name = child.name;
            self.value = child.value;
            self.indices = child.indices;
            self.children = child.children;
            self.wildcard = child.wildcard;
        }

        Some(value)
    }

    // --- draining (for merge) --------------------------------------------

    /// Visits every value in this subtree exactly once, in a deterministic order,
    /// removing it and handing `(pattern, value)` to `f`. Leaves `self` empty.
    pub(crate) fn drain_into(&mut self, mut prefix: UnescapedRoute, f: &mut dyn FnMut(alloc::string::String, T)) {
        prefix.append(&self.prefix);

        if let Some(value) = self.value.take() {
            f(prefix.to_pattern_string(), value);
        }
        for child in &mut self.children {
            child.drain_into(prefix.clone(), f);
        }
        if let Some(wildcard) = &mut self.wildcard {
            wildcard.drain_into(prefix.clone(), f);
        }

        *self = Node::new();
    }

    // --- matching ----------------------------------------------------------

    /// Matches `full_path` against this subtree, returning the matched value, the
    /// bound parameters, and the sequence of child indices/wildcard hops taken to
    /// reach it (so [`Router::at_mut`](crate::Router::at_mut) can retrace the same
    /// path mutably without duplicating this traversal).
    pub(crate) fn locate<'s, 'm>(&'s self, full_path: &'m str) -> Result<(&'s T, Params<'m>, Vec<DescentStep>), MatchError> {
        let mut current = self;
        let mut path = full_path.as_bytes();
        let mut backtracking = false;
        let mut params = Params::new();
        let mut steps: Vec<DescentStep> = Vec::new();
        let mut skipped: Vec<Skipped<'s, 'm, T>> = Vec::new();

        macro_rules! try_backtrack {
            () => {{
                let mut found = false;
                while let Some(skip) = skipped.pop() {
                    if skip.path.len() >= path.len() && skip.path.ends_with(path) {
                        path = skip.path;
                        current = skip.node;
                        params.truncate(skip.params);
                        steps.truncate(skip.steps);
                        backtracking = true;
                        found = true;
                        break;
                    }
                }
                found
            }};
        }

        'walk: loop {
            match current.kind {
                NodeKind::CatchAll => {
                    if !path.is_empty() {
                        if let Some(value) = current.value.as_ref() {
                            params.push(current.name.clone(), path);
                            return Ok((value, params, steps));
                        }
                    }
                    if try_backtrack!() {
                        continue 'walk;
                    }
                    return Err(MatchError);
                }
                NodeKind::Param => {
                    let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                    if end == 0 {
                        if try_backtrack!() {
                            continue 'walk;
                        }
                        return Err(MatchError);
                    }

                    // A literal suffix glued directly after the param (e.g. the ".txt" in
                    // "{name}.txt") lives as a static child of this node rather than in its
                    // own prefix; find the longest one the captured segment ends with.
                    let segment = &path[..end];
                    let boundary = current
                        .children
                        .iter()
                        .map(|child| child.prefix.unescaped())
                        .filter(|suffix| !suffix.is_empty() && segment.len() > suffix.len() && segment.ends_with(suffix))
                        .max_by_key(|suffix| suffix.len())
                        .map_or(end, |suffix| segment.len() - suffix.len());

                    params.push(current.name.clone(), &path[..boundary]);
                    path = &path[boundary..];
                }
                NodeKind::Static => {
                    let prefix = current.prefix.unescaped();
                    if path.len() < prefix.len() || &path[..prefix.len()] != prefix {
                        if try_backtrack!() {
                            continue 'walk;
                        }
                        return Err(MatchError);
                    }
                    path = &path[prefix.len()..];
                }
            }

            if path.is_empty() {
                if let Some(value) = current.value.as_ref() {
                    return Ok((value, params, steps));
                }
                if try_backtrack!() {
                    continue 'walk;
                }
                return Err(MatchError);
            }

            if !backtracking {
                if let Some(i) = current.indices.iter().position(|&b| b == path[0]) {
                    if current.wildcard.is_some() {
                        skipped.push(Skipped {
                            path,
                            node: current,
                            params: params.len(),
                            steps: steps.len(),
                        });
                    }
                    steps.push(DescentStep::Child(i));
                    current = &current.children[i];
                    continue 'walk;
                }
            }
            backtracking = false;

            if let Some(wildcard) = current.wildcard.as_deref() {
                steps.push(DescentStep::Wildcard);
                current = wildcard;
                continue 'walk;
            }

            if try_backtrack!() {
                continue 'walk;
            }
            return Err(MatchError);
        }
    }
}

struct Skipped<'s, 'm, T> {
    path: &'m [u8],
    node: &'s Node<T>,
    params: usize,
    steps: usize,
}

/// One hop of a successful [`Node::locate`] traversal, replayed mutably by
/// [`follow_mut`] to produce a `&mut T` without re-running backtracking.
#[derive(Clone, Copy)]
pub(crate) enum DescentStep {
    Child(usize),
    Wildcard,
}

pub(crate) fn follow_mut<'a, T>(mut node: &'a mut Node<T>, steps: &[DescentStep]) -> &'a mut T {
    for step in steps {
        node = match step {
            DescentStep::Child(i) => &mut node.children[*i],
            DescentStep::Wildcard => node.wildcard.as_deref_mut().expect("descent recorded from a successful match"),
        };
    }
    node.value.as_mut().expect("descent recorded from a successful match")
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn param_name(wildcard: &[u8]) -> &[u8] {
    let inner = &wildcard[1..wildcard.len() - 1];
    if inner.first() == Some(&b'*') {
        &inner[1..]
    } else {
        inner
    }
}

/// True if `rest` (everything right after a wildcard this insert just parsed) has
/// another unescaped `{` before the next `/` — two dynamic captures in one segment.
fn segment_has_second_wildcard(rest: UnescapedRef<'_>) -> bool {
    for (i, &b) in rest.unescaped().iter().enumerate() {
        if rest.is_escaped(i) {
            continue;
        }
        match b {
            b'/' => return false,
            b'{' => return true,
            _ => {}
        }
    }
    false
}

/// Finds the next unescaped `{...}` wildcard anywhere in `path`, returning its
/// range (including both braces) relative to `path`.
fn find_wildcard(path: UnescapedRef<'_>) -> Result<Option<Range<usize>>, InsertError> {
    let bytes = path.unescaped();
    let mut i = 0;

    while i < bytes.len() {
        if path.is_escaped(i) {
            i += 1;
            continue;
        }

        match bytes[i] {
            b'}' => return Err(InsertError::InvalidParam),
            b'{' => {
                let start = i;
                let mut j = i + 1;
                loop {
                    match bytes.get(j) {
                        None => return Err(InsertError::InvalidParam),
                        Some(_) if path.is_escaped(j) => j += 1,
                        Some(b'/') | Some(b'{') => return Err(InsertError::InvalidParam),
                        Some(b'}') => {
                            if j == start + 1 {
                                return Err(InsertError::InvalidParam);
                            }
                            return Ok(Some(start..j + 1));
                        }
                        Some(_) => j += 1,
                    }
                }
            }
            _ => i += 1,
        }
    }

    Ok(None)
}

/// Parses the wildcard that `remaining` is known to start with (`remaining[0] == b'{'`,
/// unescaped). Returns its length in bytes and whether it is a catch-all.
fn parse_wildcard_at_start(remaining: UnescapedRef<'_>) -> Result<(usize, bool), InsertError> {
    let range = find_wildcard(remaining)?.filter(|r| r.start == 0).ok_or(InsertError::InvalidParam)?;

    let name = &remaining.unescaped()[1..range.end - 1];
    if name.is_empty() {
        return Err(InsertError::InvalidParam);
    }

    let is_catch_all = name[0] == b'*';
    if is_catch_all {
        if name.len() == 1 || name[1..].contains(&b'*') {
            return Err(InsertError::InvalidParam);
        }
    } else if name.contains(&b'*') {
        return Err(InsertError::InvalidParam);
    }

    Ok((range.end, is_catch_all))
}
