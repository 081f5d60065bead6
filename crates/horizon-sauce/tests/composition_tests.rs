//! End-to-end tests: data source trees driving a simulated collection view.
//!
//! The simulated view applies every action the way a real widget does
//! (deletions at pre-batch indices, insertions at final indices, moves from
//! pre-batch to final, untouched elements filling the rest in order) and is
//! compared against a fresh query of the tree after every mutation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use horizon_sauce::model::{
    Action, ArrayDataSource, ArrayProvider, CollectionHost, CollectionView, ComposedDataSource,
    DataSource, IndexPath, ReusableView,
};

// =============================================================================
// Fixtures
// =============================================================================

struct Labels {
    prefix: String,
    initial: Vec<char>,
    movable: bool,
}

impl Labels {
    fn label(&self, letter: char) -> String {
        format!("{}{}", self.prefix, letter)
    }

    fn labels(&self, letters: &[char]) -> Vec<String> {
        letters.iter().map(|&letter| self.label(letter)).collect()
    }
}

impl ArrayProvider for Labels {
    type Item = String;

    fn load_initial_items(&self) -> Vec<String> {
        self.labels(&self.initial)
    }

    fn register_reusable_views(&self, view: &dyn CollectionView) {
        view.register_cell("label");
    }

    fn cell_for_item(&self, view: &dyn CollectionView, item: &String, index_path: IndexPath) -> ReusableView {
        view.dequeue_reusable_cell("label", index_path)
            .with_content(item.clone())
    }

    fn can_move_item(&self, _item: &String, _index_path: IndexPath) -> bool {
        self.movable
    }
}

type Leaf = Arc<ArrayDataSource<Labels>>;

fn leaf(prefix: &str, initial: &[char]) -> Leaf {
    ArrayDataSource::new_shared(Labels {
        prefix: prefix.to_string(),
        initial: initial.to_vec(),
        movable: true,
    })
}

fn set_letters(leaf: &Leaf, letters: &[char]) {
    leaf.update_items(leaf.provider().labels(letters));
}

fn composite(children: &[Arc<dyn DataSource>]) -> Arc<ComposedDataSource> {
    ComposedDataSource::builder()
        .children(children.iter().cloned())
        .build()
}

/// Deterministic linear congruential generator.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize
    }

    fn below(&mut self, bound: usize) -> usize {
        self.next() % bound
    }

    fn shuffled_subset<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut subset: Vec<T> = items.iter().filter(|_| self.next() % 2 == 0).cloned().collect();
        for i in (1..subset.len()).rev() {
            subset.swap(i, self.below(i + 1));
        }
        subset
    }
}

// =============================================================================
// Simulated collection view
// =============================================================================

/// A widget that keeps its own copy of the displayed labels and updates it
/// only through the positional primitives.
struct SimulatedView {
    root: Arc<dyn DataSource>,
    registered: Mutex<HashSet<String>>,
    sections: Mutex<Vec<Vec<String>>>,
    pending: Mutex<Option<Vec<Action>>>,
    transitions: Mutex<usize>,
}

impl SimulatedView {
    fn new(root: Arc<dyn DataSource>) -> Arc<Self> {
        Arc::new(Self {
            root,
            registered: Mutex::new(HashSet::new()),
            sections: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            transitions: Mutex::new(0),
        })
    }

    fn reload_data(&self) {
        *self.sections.lock() = self.query();
    }

    fn snapshot(&self) -> Vec<Vec<String>> {
        self.sections.lock().clone()
    }

    fn transitions(&self) -> usize {
        *self.transitions.lock()
    }

    /// What the tree says the view should show right now.
    fn query(&self) -> Vec<Vec<String>> {
        (0..self.root.number_of_sections())
            .map(|section| self.fetch_section(section))
            .collect()
    }

    fn fetch_section(&self, section: usize) -> Vec<String> {
        (0..self.root.number_of_items(section))
            .map(|item| self.fetch_item(IndexPath::new(section, item)))
            .collect()
    }

    fn fetch_item(&self, index_path: IndexPath) -> String {
        let cell = self.root.cell_for_item(self, index_path);
        assert!(
            self.registered.lock().contains(&cell.reuse_identifier),
            "cell template {:?} dequeued before registration",
            cell.reuse_identifier
        );
        assert_eq!(cell.index_path, index_path);
        cell.content.expect("cell without content")
    }

    fn record(&self, action: Action) {
        if let Some(ops) = self.pending.lock().as_mut() {
            ops.push(action);
            return;
        }
        self.apply_transition(vec![action]);
    }

    fn apply_transition(&self, ops: Vec<Action>) {
        *self.transitions.lock() += 1;
        let mut sections = self.snapshot();

        let mut deleted_sections = Vec::new();
        let mut inserted_sections = Vec::new();
        let mut moved_sections = Vec::new();
        let mut reloaded_sections = Vec::new();
        let mut deleted_items: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut inserted_items: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut moved_items: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        let mut reloaded_items = Vec::new();

        for op in ops {
            match op {
                Action::DeleteSections(s) => deleted_sections.extend(s),
                Action::InsertSections(s) => inserted_sections.extend(s),
                Action::MoveSection { from, to } => moved_sections.push((from, to)),
                Action::ReloadSections(s) => reloaded_sections.extend(s),
                Action::DeleteItems(paths) => {
                    for p in paths {
                        deleted_items.entry(p.section).or_default().push(p.item);
                    }
                }
                Action::InsertItems(paths) => {
                    for p in paths {
                        inserted_items.entry(p.section).or_default().push(p.item);
                    }
                }
                Action::MoveItem { from, to } => {
                    assert_eq!(from.section, to.section, "item moved across sections");
                    moved_items
                        .entry(from.section)
                        .or_default()
                        .push((from.item, to.item));
                }
                Action::ReloadItems(paths) => reloaded_items.extend(paths),
                Action::Batch(_) => panic!("nested batch reached the view"),
            }
        }

        let section_level =
            !deleted_sections.is_empty() || !inserted_sections.is_empty() || !moved_sections.is_empty();
        let item_level = !deleted_items.is_empty() || !inserted_items.is_empty() || !moved_items.is_empty();
        assert!(
            !(section_level && item_level),
            "item and section updates mixed in one transition"
        );

        if section_level {
            let inserted = inserted_sections
                .iter()
                .map(|&section| (section, self.fetch_section(section)))
                .collect();
            sections = replay(sections, &deleted_sections, inserted, &moved_sections);
        }

        let touched: BTreeSet<usize> = deleted_items
            .keys()
            .chain(inserted_items.keys())
            .chain(moved_items.keys())
            .copied()
            .collect();
        for section in touched {
            let old = std::mem::take(&mut sections[section]);
            let inserted = inserted_items
                .get(&section)
                .into_iter()
                .flatten()
                .map(|&item| (item, self.fetch_item(IndexPath::new(section, item))))
                .collect();
            sections[section] = replay(
                old,
                deleted_items.get(&section).map_or(&[][..], Vec::as_slice),
                inserted,
                moved_items.get(&section).map_or(&[][..], Vec::as_slice),
            );
        }

        for section in reloaded_sections {
            sections[section] = self.fetch_section(section);
        }
        for path in reloaded_items {
            sections[path.section][path.item] = self.fetch_item(path);
        }

        *self.sections.lock() = sections;
    }
}

/// Applies one transition's edit sets to `old`.
fn replay<T: Clone + Debug>(
    old: Vec<T>,
    deleted: &[usize],
    inserted: Vec<(usize, T)>,
    moves: &[(usize, usize)],
) -> Vec<T> {
    let final_len = old.len() + inserted.len() - deleted.len();
    let mut slots: Vec<Option<T>> = vec![None; final_len];

    for (index, value) in inserted {
        assert!(slots[index].is_none(), "two insertions at {index}");
        slots[index] = Some(value);
    }
    for &(from, to) in moves {
        assert!(!deleted.contains(&from), "moved a deleted element from {from}");
        assert!(slots[to].is_none(), "two elements target {to}");
        slots[to] = Some(old[from].clone());
    }

    let mut untouched = old
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !deleted.contains(index) && !moves.iter().any(|(from, _)| from == index))
        .map(|(_, value)| value);
    for slot in slots.iter_mut().filter(|slot| slot.is_none()) {
        *slot = Some(untouched.next().expect("more free slots than untouched elements"));
    }
    assert!(untouched.next().is_none(), "untouched elements left without a slot");

    slots.into_iter().map(|slot| slot.expect("slot filled")).collect()
}

impl CollectionView for SimulatedView {
    fn register_cell(&self, reuse_identifier: &str) {
        self.registered.lock().insert(reuse_identifier.to_string());
    }

    fn register_supplementary_view(&self, kind: &str, reuse_identifier: &str) {
        self.registered
            .lock()
            .insert(format!("{kind}/{reuse_identifier}"));
    }

    fn insert_items(&self, index_paths: &[IndexPath]) {
        self.record(Action::InsertItems(index_paths.to_vec()));
    }

    fn delete_items(&self, index_paths: &[IndexPath]) {
        self.record(Action::DeleteItems(index_paths.to_vec()));
    }

    fn reload_items(&self, index_paths: &[IndexPath]) {
        self.record(Action::ReloadItems(index_paths.to_vec()));
    }

    fn move_item(&self, from: IndexPath, to: IndexPath) {
        self.record(Action::MoveItem { from, to });
    }

    fn insert_sections(&self, sections: &[usize]) {
        self.record(Action::InsertSections(sections.to_vec()));
    }

    fn delete_sections(&self, sections: &[usize]) {
        self.record(Action::DeleteSections(sections.to_vec()));
    }

    fn reload_sections(&self, sections: &[usize]) {
        self.record(Action::ReloadSections(sections.to_vec()));
    }

    fn move_section(&self, from: usize, to: usize) {
        self.record(Action::MoveSection { from, to });
    }

    fn perform_batch_updates(&self, updates: &mut dyn FnMut()) {
        let previous = self.pending.lock().replace(Vec::new());
        assert!(previous.is_none(), "nested batch updates");
        updates();
        let ops = self.pending.lock().take().unwrap_or_default();
        self.apply_transition(ops);
    }
}

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    root: Arc<ComposedDataSource>,
    host: Arc<CollectionHost>,
    view: Arc<SimulatedView>,
    actions: Arc<Mutex<Vec<Action>>>,
}

impl Harness {
    fn new(root: Arc<ComposedDataSource>) -> Self {
        let host = CollectionHost::new(root.clone());
        let view = SimulatedView::new(root.clone());
        host.load_view(view.clone());
        view.reload_data();

        let actions = Arc::new(Mutex::new(Vec::new()));
        let sink = actions.clone();
        host.action_performed()
            .connect(move |action: &Action| sink.lock().push(action.clone()));

        Self {
            root,
            host,
            view,
            actions,
        }
    }

    fn take_actions(&self) -> Vec<Action> {
        std::mem::take(&mut *self.actions.lock())
    }

    fn assert_in_sync(&self, context: &str) {
        assert_eq!(self.view.snapshot(), self.view.query(), "view out of sync after {context}");
        assert_mapping_consistent(&self.root);
    }
}

fn assert_mapping_consistent(composite: &ComposedDataSource) {
    let children = composite.children();
    let total: usize = children.iter().map(|c| c.number_of_sections()).sum();
    assert_eq!(composite.number_of_sections(), total);

    for child in &children {
        for local in 0..child.number_of_sections() {
            let global = composite.unmap(child.id(), local);
            let (owner, back) = composite.map(global);
            assert_eq!(owner.id(), child.id());
            assert_eq!(back, local);
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_leaf_update_replays_on_view() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_sauce=trace")
        .with_test_writer()
        .try_init();

    let letters = leaf("", &['A', 'B', 'C']);
    let h = Harness::new(composite(&[letters.clone()]));
    assert_eq!(h.view.snapshot(), vec![vec!["A", "B", "C"]]);

    set_letters(&letters, &['B', 'C', 'D']);

    assert_eq!(
        h.take_actions(),
        vec![Action::batch([
            Action::DeleteItems(vec![IndexPath::new(0, 0)]),
            Action::InsertItems(vec![IndexPath::new(0, 2)]),
            Action::MoveItem {
                from: IndexPath::new(0, 1),
                to: IndexPath::new(0, 0)
            },
            Action::MoveItem {
                from: IndexPath::new(0, 2),
                to: IndexPath::new(0, 1)
            },
        ])]
    );
    assert_eq!(h.view.snapshot(), vec![vec!["B", "C", "D"]]);
    assert_eq!(h.view.transitions(), 1);
    h.assert_in_sync("leaf update");
}

#[test]
fn test_add_and_remove_children() {
    let x = composite(&[leaf("x0", &['a']), leaf("x1", &['a'])]);
    let y = leaf("y", &['a', 'b']);
    let h = Harness::new(composite(&[x.clone(), y.clone()]));
    assert_eq!(h.host.number_of_sections(), 3);

    let z = composite(&[leaf("z0", &['a']), leaf("z1", &[]), leaf("z2", &['a', 'b'])]);
    h.root.add(z.clone(), Some(1));

    assert_eq!(h.take_actions(), vec![Action::InsertSections(vec![2, 3, 4])]);
    assert_eq!(h.root.section_indices(y.id()), 5..6);
    h.assert_in_sync("add");

    assert!(h.root.remove(&*y));

    assert_eq!(h.take_actions(), vec![Action::DeleteSections(vec![5])]);
    h.assert_in_sync("remove");
}

#[test]
fn test_cells_from_later_children_use_global_positions() {
    let first = leaf("f", &['a']);
    let second = leaf("s", &['a', 'b']);
    let nested = composite(&[leaf("n0", &[]), leaf("n1", &['z'])]);
    let h = Harness::new(composite(&[first.clone(), second.clone(), nested.clone()]));

    let cell = h.host.cell_for_item(IndexPath::new(1, 1)).unwrap();
    assert_eq!(cell.index_path, IndexPath::new(1, 1));
    assert_eq!(cell.content.as_deref(), Some("sb"));

    let cell = h.host.cell_for_item(IndexPath::new(3, 0)).unwrap();
    assert_eq!(cell.index_path, IndexPath::new(3, 0));
    assert_eq!(cell.content.as_deref(), Some("n1z"));
}

#[test]
fn test_identical_update_children_emits_nothing() {
    let a = leaf("a", &['1']);
    let b = leaf("b", &['1']);
    let h = Harness::new(composite(&[a.clone(), b.clone()]));
    let transitions = h.view.transitions();

    h.root.update_children([a.clone() as Arc<dyn DataSource>, b.clone()]);

    assert!(h.take_actions().is_empty());
    assert_eq!(h.view.transitions(), transitions);
}

#[test]
fn test_update_children_reorders_nested_sections() {
    let a = leaf("a", &['1']);
    let b = composite(&[leaf("b0", &['1']), leaf("b1", &['1', '2'])]);
    let c = leaf("c", &['1', '2', '3']);
    let d = composite(&[leaf("d0", &['1']), leaf("d1", &[])]);
    let h = Harness::new(composite(&[a.clone(), b.clone(), c.clone()]));

    h.root
        .update_children([c.clone() as Arc<dyn DataSource>, d.clone(), b.clone()]);

    let actions = h.take_actions();
    assert_eq!(actions.len(), 1);
    assert!(matches!(&actions[0], Action::Batch(_)));
    h.assert_in_sync("update_children");
    assert!(a.container().is_none());
}

#[test]
fn test_nested_leaf_update_is_readdressed() {
    let inner_leaf = leaf("n", &['a', 'b']);
    let inner = composite(&[leaf("m", &['a']), inner_leaf.clone()]);
    let h = Harness::new(composite(&[leaf("top", &['a']), inner.clone()]));

    set_letters(&inner_leaf, &['b', 'c']);

    let actions = h.take_actions();
    let Action::Batch(batch) = &actions[0] else {
        panic!("expected a batch, got {actions:?}");
    };
    assert_eq!(batch[0], Action::DeleteItems(vec![IndexPath::new(2, 0)]));
    h.assert_in_sync("nested update");

    assert_eq!(
        inner_leaf.to_global_index_path(IndexPath::new(0, 1)),
        Some(IndexPath::new(2, 1))
    );
    assert_eq!(
        inner_leaf.to_local_index_path(IndexPath::new(2, 1)),
        Some(IndexPath::new(0, 1))
    );
}

#[test]
fn test_nested_add_invalidates_ancestors() {
    let inner = composite(&[leaf("m", &['a'])]);
    let tail = leaf("t", &['a']);
    let h = Harness::new(composite(&[inner.clone(), tail.clone()]));
    assert_eq!(h.root.section_indices(tail.id()), 1..2);

    inner.add(leaf("n", &['x', 'y']), None);

    assert_eq!(h.take_actions(), vec![Action::InsertSections(vec![1])]);
    assert_eq!(h.root.section_indices(tail.id()), 2..3);
    h.assert_in_sync("nested add");
}

#[test]
fn test_interactive_move_within_child() {
    let letters = leaf("", &['a', 'b', 'c']);
    let root = ComposedDataSource::builder()
        .moving_enabled(true)
        .child(leaf("head", &['x']))
        .child(letters.clone())
        .build();
    let h = Harness::new(root);

    assert!(h.root.can_move_item(IndexPath::new(1, 0)));
    h.host.move_item(IndexPath::new(1, 0), IndexPath::new(1, 2));

    assert_eq!(letters.items(), vec!["b", "c", "a"]);
    assert!(h.take_actions().is_empty());
}

#[test]
#[should_panic(expected = "cannot move an item")]
fn test_interactive_move_across_children_panics() {
    let root = ComposedDataSource::builder()
        .moving_enabled(true)
        .child(leaf("l", &['a']))
        .child(leaf("r", &['a']))
        .build();
    let h = Harness::new(root);
    h.host.move_item(IndexPath::new(0, 0), IndexPath::new(1, 0));
}

#[test]
fn test_random_mutations_stay_in_sync() {
    let alphabet = ['a', 'b', 'c', 'd', 'e', 'f'];
    let mut rng = Lcg(0x5eed);

    let leaves: Vec<Leaf> = (0..6)
        .map(|i| leaf(&format!("L{i}-"), &['a', 'b']))
        .collect();
    let nested_leaves: Vec<Leaf> = (0..3)
        .map(|i| leaf(&format!("M{i}-"), &['a']))
        .collect();
    let nested_pool: Vec<Arc<dyn DataSource>> = nested_leaves
        .iter()
        .map(|l| l.clone() as Arc<dyn DataSource>)
        .collect();
    let nested = composite(&nested_pool[..1]);

    let mut pool: Vec<Arc<dyn DataSource>> = leaves
        .iter()
        .map(|l| l.clone() as Arc<dyn DataSource>)
        .collect();
    pool.push(nested.clone());

    let h = Harness::new(composite(&pool[..3]));

    for step in 0..400 {
        let context = match rng.below(6) {
            0 => {
                let child = pool[rng.below(pool.len())].clone();
                let index = rng.below(h.root.number_of_children() + 1);
                h.root.add(child, Some(index));
                format!("step {step}: add at {index}")
            }
            1 => {
                let child = &pool[rng.below(pool.len())];
                h.root.remove(child.as_ref());
                format!("step {step}: remove")
            }
            2 => {
                h.root.update_children(rng.shuffled_subset(&pool));
                format!("step {step}: update_children")
            }
            3 => {
                let target = &leaves[rng.below(leaves.len())];
                set_letters(target, &rng.shuffled_subset(&alphabet));
                format!("step {step}: leaf update")
            }
            4 => {
                nested.update_children(rng.shuffled_subset(&nested_pool));
                format!("step {step}: nested update_children")
            }
            _ => {
                let target = &nested_leaves[rng.below(nested_leaves.len())];
                set_letters(target, &rng.shuffled_subset(&alphabet));
                format!("step {step}: nested leaf update")
            }
        };

        h.assert_in_sync(&context);
        assert_mapping_consistent(&nested);
    }
}
