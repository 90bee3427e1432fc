// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The set of currently selected pipeline items.

use kiln_core::pipeline::ItemKey;

/// Selected items, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<ItemKey>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one pick result.
    ///
    /// `None` clears the selection. With `multi` set a new item is appended
    /// and an already selected one is left alone; without it the selection
    /// becomes exactly that item.
    pub fn select(&mut self, item: Option<ItemKey>, multi: bool) {
        let Some(item) = item else {
            self.items.clear();
            return;
        };

        if self.contains(item) {
            if !multi {
                self.items.clear();
                self.items.push(item);
            }
            return;
        }

        if !multi {
            self.items.clear();
        }
        self.items.push(item);
    }

    /// Whether `item` is selected.
    pub fn contains(&self, item: ItemKey) -> bool {
        self.items.contains(&item)
    }

    /// The most recently selected item.
    pub fn last(&self) -> Option<ItemKey> {
        self.items.last().copied()
    }

    /// Every selected item.
    pub fn items(&self) -> &[ItemKey] {
        &self.items
    }

    /// Drops items for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&ItemKey) -> bool) {
        self.items.retain(keep);
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<ItemKey> {
        let mut map: SlotMap<ItemKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_single_select_replaces() {
        let k = keys(2);
        let mut sel = Selection::new();
        sel.select(Some(k[0]), false);
        sel.select(Some(k[1]), false);
        assert_eq!(sel.items(), &[k[1]]);
    }

    #[test]
    fn test_multi_select_accumulates_without_duplicates() {
        let k = keys(2);
        let mut sel = Selection::new();
        sel.select(Some(k[0]), true);
        sel.select(Some(k[1]), true);
        sel.select(Some(k[0]), true);
        assert_eq!(sel.items(), &[k[0], k[1]], "re-adding is a no-op");
    }

    #[test]
    fn test_reselecting_sole_item_is_a_no_op() {
        let k = keys(1);
        let mut sel = Selection::new();
        sel.select(Some(k[0]), false);
        sel.select(Some(k[0]), false);
        assert_eq!(sel.items(), &[k[0]]);
    }

    #[test]
    fn test_selected_item_without_multi_becomes_sole_selection() {
        let k = keys(2);
        let mut sel = Selection::new();
        sel.select(Some(k[0]), true);
        sel.select(Some(k[1]), true);
        sel.select(Some(k[0]), false);
        assert_eq!(sel.items(), &[k[0]]);
    }

    #[test]
    fn test_null_clears() {
        let k = keys(1);
        let mut sel = Selection::new();
        sel.select(Some(k[0]), true);
        sel.select(None, true);
        assert!(sel.is_empty());
    }
}
