//! Task links and term links: the indexed paths along which a concept
//! reaches its tasks and its structurally related terms.
//!
//! Every compound term yields a fixed set of link templates — one for each
//! position from which the compound can reach, or be reached from, a
//! component. The dispatch engine later keys entirely off a link's type
//! tag and index path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::budget::BudgetValue;
use crate::constants::{NOVELTY_HORIZON, RECORD_LENGTH};
use crate::task::Task;
use crate::term::{CompoundTerm, Term, TermOperator};

/// How a link's owner relates to the link's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermLinkType {
    /// Task link only: the task is about the concept's own term.
    SelfLink,
    /// From a compound to one of its components.
    Component,
    /// From a component up to the compound.
    Compound,
    /// From a statement to one of its sides.
    ComponentStatement,
    /// From a side up to the statement.
    CompoundStatement,
    /// From a conditional statement into its condition's components.
    ComponentCondition,
    /// From a condition component up to the conditional statement.
    CompoundCondition,
    /// Product/image positions reachable only through term rewriting.
    Transform,
}

impl TermLinkType {
    /// The component-side counterpart of a compound-side template tag.
    pub fn toward_component(self) -> TermLinkType {
        match self {
            TermLinkType::Compound => TermLinkType::Component,
            TermLinkType::CompoundStatement => TermLinkType::ComponentStatement,
            TermLinkType::CompoundCondition => TermLinkType::ComponentCondition,
            other => other,
        }
    }

    pub fn is_transform(self) -> bool {
        self == TermLinkType::Transform
    }
}

/// A link from a concept to a structurally related term.
#[derive(Clone, Serialize, Deserialize)]
pub struct TermLink {
    pub target: Term,
    pub budget: BudgetValue,
    pub link_type: TermLinkType,
    /// Path of component positions from the compound down to the target.
    pub indices: Vec<usize>,
    pub key: String,
}

impl TermLink {
    pub fn new(
        target: Term,
        budget: BudgetValue,
        link_type: TermLinkType,
        indices: Vec<usize>,
    ) -> Self {
        let key = make_key(&target, link_type, &indices);
        Self {
            target,
            budget,
            link_type,
            indices,
            key,
        }
    }

    /// Build a concrete link from a template, on the compound side.
    pub fn from_template(template: &TermLinkTemplate, budget: BudgetValue) -> Self {
        Self::new(
            template.target.clone(),
            budget,
            template.link_type,
            template.indices.clone(),
        )
    }

    pub fn index(&self, level: usize) -> usize {
        self.indices[level]
    }
}

impl fmt::Debug for TermLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.budget, self.key)
    }
}

fn make_key(target: &Term, link_type: TermLinkType, indices: &[usize]) -> String {
    let mut at = String::new();
    for i in indices {
        at.push_str(&format!("-{i}"));
    }
    let component_side = matches!(
        link_type,
        TermLinkType::Component | TermLinkType::ComponentStatement | TermLinkType::ComponentCondition
    );
    if component_side {
        format!("_@({at}) {target}")
    } else {
        format!("@({at})_ {target}")
    }
}

/// One novelty record: a term-link key and when it was last paired.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PairRecord {
    key: String,
    time: i64,
}

/// A link from a concept to a task, with a rolling memory of which term
/// links it was recently paired with.
#[derive(Clone, Serialize, Deserialize)]
pub struct TaskLink {
    #[serde(skip)]
    pub target: Option<Rc<Task>>,
    pub budget: BudgetValue,
    pub link_type: TermLinkType,
    pub indices: Vec<usize>,
    pub key: String,
    records: Vec<PairRecord>,
}

impl TaskLink {
    pub fn new(
        target: Rc<Task>,
        budget: BudgetValue,
        link_type: TermLinkType,
        indices: Vec<usize>,
    ) -> Self {
        let key = format!(
            "{} {}",
            make_key(&target.sentence.content, link_type, &indices),
            target.key()
        );
        Self {
            target: Some(target),
            budget,
            link_type,
            indices,
            key,
            records: Vec::new(),
        }
    }

    /// Self-referential link created when a task arrives at the concept
    /// named by its own content.
    pub fn new_self(target: Rc<Task>, budget: BudgetValue) -> Self {
        Self::new(target, budget, TermLinkType::SelfLink, Vec::new())
    }

    pub fn index(&self, level: usize) -> usize {
        self.indices[level]
    }

    /// Whether pairing this task with `term_link` would repeat recent
    /// work. A remembered pairing becomes novel again after the horizon
    /// passes; a fresh pairing is recorded, evicting the oldest entry
    /// once the record is full.
    pub fn novel(&mut self, term_link: &TermLink, current_time: i64) -> bool {
        if let Some(task) = &self.target {
            if term_link.target == task.sentence.content {
                return false;
            }
        }
        if let Some(record) = self.records.iter_mut().find(|r| r.key == term_link.key) {
            if current_time < record.time + NOVELTY_HORIZON {
                return false;
            }
            record.time = current_time;
            return true;
        }
        if self.records.len() >= RECORD_LENGTH {
            self.records.remove(0);
        }
        self.records.push(PairRecord {
            key: term_link.key.clone(),
            time: current_time,
        });
        true
    }
}

impl fmt::Debug for TaskLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.budget, self.key)
    }
}

/// A term-link template: compound-side tag, target and index path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLinkTemplate {
    pub target: Term,
    pub link_type: TermLinkType,
    pub indices: Vec<usize>,
}

impl TermLinkTemplate {
    fn new(target: Term, link_type: TermLinkType, indices: Vec<usize>) -> Self {
        // condition links carry an implicit leading 0: the condition side
        // of the statement
        let indices = if link_type == TermLinkType::CompoundCondition {
            let mut with_prefix = vec![0];
            with_prefix.extend(indices);
            with_prefix
        } else {
            indices
        };
        Self {
            target,
            link_type,
            indices,
        }
    }
}

/// Precompute every link template for a compound term: one per reachable
/// component position, conditions recursed as `CompoundCondition`, and
/// product/image positions tagged `Transform` down to the third level.
pub fn component_link_templates(term: &Term) -> Vec<TermLinkTemplate> {
    let mut templates = Vec::new();
    if let Some(compound) = term.as_compound() {
        let link_type = if compound.op.is_statement() {
            TermLinkType::CompoundStatement
        } else {
            TermLinkType::Compound
        };
        prepare(&mut templates, link_type, compound, compound);
    }
    templates
}

fn is_product_or_image(t: &Term) -> bool {
    matches!(
        t.op(),
        Some(TermOperator::Product) | Some(TermOperator::ImageExt) | Some(TermOperator::ImageInt)
    )
}

fn prepare(
    out: &mut Vec<TermLinkTemplate>,
    link_type: TermLinkType,
    root: &CompoundTerm,
    term: &CompoundTerm,
) {
    for (i, t1) in term.components.iter().enumerate() {
        if t1.is_constant() {
            out.push(TermLinkTemplate::new(t1.clone(), link_type, vec![i]));
        }
        let conditional = (root.op == TermOperator::Equivalence
            || (root.op == TermOperator::Implication && i == 0))
            && matches!(
                t1.op(),
                Some(TermOperator::Conjunction) | Some(TermOperator::Negation)
            );
        if conditional {
            let c1 = t1.as_compound().expect("conditional component is compound");
            prepare(out, TermLinkType::CompoundCondition, c1, c1);
        } else if let Some(c1) = t1.as_compound() {
            for (j, t2) in c1.components.iter().enumerate() {
                if t2.is_constant() {
                    if is_product_or_image(t1) {
                        let indices = if link_type == TermLinkType::CompoundCondition {
                            vec![0, i, j]
                        } else {
                            vec![i, j]
                        };
                        out.push(TermLinkTemplate {
                            target: t2.clone(),
                            link_type: TermLinkType::Transform,
                            indices,
                        });
                    } else {
                        out.push(TermLinkTemplate::new(t2.clone(), link_type, vec![i, j]));
                    }
                }
                if is_product_or_image(t2) {
                    let c2 = t2.as_compound().expect("checked compound");
                    for (k, t3) in c2.components.iter().enumerate() {
                        if t3.is_constant() {
                            let indices = if link_type == TermLinkType::CompoundCondition {
                                vec![0, i, j, k]
                            } else {
                                vec![i, j, k]
                            };
                            out.push(TermLinkTemplate {
                                target: t3.clone(),
                                link_type: TermLinkType::Transform,
                                indices,
                            });
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make;
    use crate::sentence::Sentence;
    use crate::stamp::Stamp;
    use crate::truth::TruthValue;

    fn w(s: &str) -> Term {
        Term::word(s)
    }

    fn budget() -> BudgetValue {
        BudgetValue::new(0.5, 0.5, 0.5)
    }

    #[test]
    fn test_statement_templates() {
        let st = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let templates = component_link_templates(&st);
        assert_eq!(templates.len(), 2);
        assert!(templates.iter().all(|t| t.link_type == TermLinkType::CompoundStatement));
        assert_eq!(templates[0].target, w("robin"));
        assert_eq!(templates[0].indices, vec![0]);
    }

    #[test]
    fn test_nested_statement_templates() {
        // <<robin --> bird> ==> <robin --> animal>>
        let a = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let b = make::make_inheritance(w("robin"), w("animal")).unwrap();
        let st = make::make_implication(a.clone(), b).unwrap();
        let templates = component_link_templates(&st);
        // two sides plus their four words
        assert_eq!(templates.len(), 6);
        assert!(
            templates
                .iter()
                .any(|t| t.target == a && t.indices == vec![0])
        );
        assert!(
            templates
                .iter()
                .any(|t| t.target == w("animal") && t.indices == vec![1, 1])
        );
    }

    #[test]
    fn test_conditional_templates() {
        // <(&&, <robin --> bird>, <robin --> [flying]>) ==> <robin --> animal>>
        let c1 = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let c2 = make::make_inheritance(
            w("robin"),
            make::make_set_int(vec![w("flying")]).unwrap(),
        )
        .unwrap();
        let condition = make::make_conjunction(vec![c1.clone(), c2]).unwrap();
        let conclusion = make::make_inheritance(w("robin"), w("animal")).unwrap();
        let st = make::make_implication(condition, conclusion).unwrap();
        let templates = component_link_templates(&st);
        let conditionals: Vec<_> = templates
            .iter()
            .filter(|t| t.link_type == TermLinkType::CompoundCondition)
            .collect();
        assert!(!conditionals.is_empty(), "condition components must link");
        // condition links carry the leading 0 for the condition side
        assert!(conditionals.iter().all(|t| t.indices[0] == 0));
        assert!(conditionals.iter().any(|t| t.target == c1));
    }

    #[test]
    fn test_transform_templates_for_products() {
        // <(*,acid,base) --> reaction>
        let product = make::make_product(vec![w("acid"), w("base")]).unwrap();
        let st = make::make_inheritance(product, w("reaction")).unwrap();
        let templates = component_link_templates(&st);
        let transforms: Vec<_> = templates
            .iter()
            .filter(|t| t.link_type == TermLinkType::Transform)
            .collect();
        assert_eq!(transforms.len(), 2);
        assert!(transforms.iter().any(|t| t.indices == vec![0, 0]));
        assert!(transforms.iter().any(|t| t.indices == vec![0, 1]));
    }

    #[test]
    fn test_novelty_record() {
        let task = Rc::new(Task::new_input(
            Sentence::new_judgement(
                make::make_inheritance(w("robin"), w("bird")).unwrap(),
                TruthValue::new(1.0, 0.9),
                Stamp::new(1, 0),
            ),
            budget(),
        ));
        let mut t_link = TaskLink::new_self(task, budget());
        let b_link = TermLink::new(w("animal"), budget(), TermLinkType::Compound, vec![0]);
        assert!(t_link.novel(&b_link, 10));
        // immediately again: stale
        assert!(!t_link.novel(&b_link, 11));
        // after the horizon: novel again
        assert!(t_link.novel(&b_link, 10 + NOVELTY_HORIZON + 1));
    }

    #[test]
    fn test_novelty_rejects_own_content() {
        let content = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let task = Rc::new(Task::new_input(
            Sentence::new_judgement(content.clone(), TruthValue::new(1.0, 0.9), Stamp::new(1, 0)),
            budget(),
        ));
        let mut t_link = TaskLink::new_self(task, budget());
        let b_link = TermLink::new(content, budget(), TermLinkType::Compound, vec![0]);
        assert!(!t_link.novel(&b_link, 5));
    }

    #[test]
    fn test_record_length_bound() {
        let task = Rc::new(Task::new_input(
            Sentence::new_judgement(
                make::make_inheritance(w("robin"), w("bird")).unwrap(),
                TruthValue::new(1.0, 0.9),
                Stamp::new(1, 0),
            ),
            budget(),
        ));
        let mut t_link = TaskLink::new_self(task, budget());
        for i in 0..(RECORD_LENGTH + 5) {
            let link = TermLink::new(
                w(&format!("t{i}")),
                budget(),
                TermLinkType::Compound,
                vec![0],
            );
            t_link.novel(&link, i as i64);
        }
        assert!(t_link.records.len() <= RECORD_LENGTH);
    }
}
