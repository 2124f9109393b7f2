//! The term algebra: words, variables and compound terms as one closed
//! tagged union, with structural equality, a total order, syntactic
//! complexity and canonical naming.
//!
//! Terms are deeply immutable once published into a sentence. The only
//! code that produces non-canonical intermediate shapes is the
//! substitution engine, and it always finishes by rebuilding through the
//! `make` constructors.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The three variable kinds, in their surface notation:
/// `$x` independent, `#x` dependent, `?x` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Independent,
    Dependent,
    Query,
}

impl VariableKind {
    pub fn prefix(self) -> char {
        match self {
            VariableKind::Independent => '$',
            VariableKind::Dependent => '#',
            VariableKind::Query => '?',
        }
    }
}

/// Operator tag of a compound term. The final four are the statement
/// copulas; a statement is just a 2-ary compound with a copula operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TermOperator {
    SetExt,
    SetInt,
    IntersectionExt,
    IntersectionInt,
    DifferenceExt,
    DifferenceInt,
    Product,
    ImageExt,
    ImageInt,
    Negation,
    Conjunction,
    Disjunction,
    Inheritance,
    Similarity,
    Implication,
    Equivalence,
}

impl TermOperator {
    /// Whether component order is irrelevant (children stored sorted and
    /// deduplicated).
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            TermOperator::SetExt
                | TermOperator::SetInt
                | TermOperator::IntersectionExt
                | TermOperator::IntersectionInt
                | TermOperator::Conjunction
                | TermOperator::Disjunction
                | TermOperator::Similarity
                | TermOperator::Equivalence
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            TermOperator::Inheritance
                | TermOperator::Similarity
                | TermOperator::Implication
                | TermOperator::Equivalence
        )
    }

    /// Statements whose subject and predicate play different roles.
    pub fn is_asymmetric_statement(self) -> bool {
        matches!(self, TermOperator::Inheritance | TermOperator::Implication)
    }

    /// Statements at the "higher order" level (between statements).
    pub fn is_higher_order(self) -> bool {
        matches!(self, TermOperator::Implication | TermOperator::Equivalence)
    }

    pub fn is_image(self) -> bool {
        matches!(self, TermOperator::ImageExt | TermOperator::ImageInt)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TermOperator::SetExt => "{}",
            TermOperator::SetInt => "[]",
            TermOperator::IntersectionExt => "&",
            TermOperator::IntersectionInt => "|",
            TermOperator::DifferenceExt => "-",
            TermOperator::DifferenceInt => "~",
            TermOperator::Product => "*",
            TermOperator::ImageExt => "/",
            TermOperator::ImageInt => "\\",
            TermOperator::Negation => "--",
            TermOperator::Conjunction => "&&",
            TermOperator::Disjunction => "||",
            TermOperator::Inheritance => "-->",
            TermOperator::Similarity => "<->",
            TermOperator::Implication => "==>",
            TermOperator::Equivalence => "<=>",
        }
    }
}

/// A compound term: operator, components, and (for images only) the
/// position of the elided argument.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundTerm {
    pub op: TermOperator,
    pub components: Vec<Term>,
    pub relation_index: usize,
}

impl CompoundTerm {
    pub fn size(&self) -> usize {
        self.components.len()
    }
}

/// A node of a logical expression tree.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Word(String),
    Variable(VariableKind, u32),
    Compound(CompoundTerm),
}

impl Term {
    pub fn word(name: &str) -> Term {
        Term::Word(name.to_string())
    }

    pub fn variable(kind: VariableKind, id: u32) -> Term {
        Term::Variable(kind, id)
    }

    pub fn as_compound(&self) -> Option<&CompoundTerm> {
        match self {
            Term::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// The compound, but only when its operator is a statement copula.
    pub fn as_statement(&self) -> Option<&CompoundTerm> {
        self.as_compound().filter(|c| c.op.is_statement())
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Term::Compound(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(..))
    }

    pub fn is_statement(&self) -> bool {
        self.as_statement().is_some()
    }

    pub fn op(&self) -> Option<TermOperator> {
        self.as_compound().map(|c| c.op)
    }

    /// Subject of a statement. Panics when the term is not a statement;
    /// callers guard with `is_statement` / `as_statement`.
    pub fn subject(&self) -> &Term {
        &self.as_statement().expect("not a statement").components[0]
    }

    pub fn predicate(&self) -> &Term {
        &self.as_statement().expect("not a statement").components[1]
    }

    /// Syntactic complexity: words count 1, variables 0, compounds one
    /// more than the sum of their components.
    pub fn complexity(&self) -> usize {
        match self {
            Term::Word(_) => 1,
            Term::Variable(..) => 0,
            Term::Compound(c) => 1 + c.components.iter().map(Term::complexity).sum::<usize>(),
        }
    }

    /// Whether this term names a concept: no non-query variable occurs
    /// exactly once (a lone variable leaves the term open; a repeated one
    /// still expresses a closed pattern).
    pub fn is_constant(&self) -> bool {
        match self {
            Term::Word(_) => true,
            Term::Variable(..) => false,
            Term::Compound(_) => {
                let mut counts: Vec<((VariableKind, u32), usize)> = Vec::new();
                self.count_vars(&mut counts);
                counts
                    .iter()
                    .all(|((kind, _), n)| *kind == VariableKind::Query || *n != 1)
            }
        }
    }

    fn count_vars(&self, counts: &mut Vec<((VariableKind, u32), usize)>) {
        match self {
            Term::Word(_) => {}
            Term::Variable(kind, id) => {
                let key = (*kind, *id);
                match counts.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((key, 1)),
                }
            }
            Term::Compound(c) => {
                for t in &c.components {
                    t.count_vars(counts);
                }
            }
        }
    }

    pub fn contains_var(&self) -> bool {
        match self {
            Term::Word(_) => false,
            Term::Variable(..) => true,
            Term::Compound(c) => c.components.iter().any(Term::contains_var),
        }
    }

    pub fn contains_var_kind(&self, kind: VariableKind) -> bool {
        match self {
            Term::Word(_) => false,
            Term::Variable(k, _) => *k == kind,
            Term::Compound(c) => c.components.iter().any(|t| t.contains_var_kind(kind)),
        }
    }

    pub fn contains_query_var(&self) -> bool {
        self.contains_var_kind(VariableKind::Query)
    }

    /// Direct component membership.
    pub fn contains_component(&self, sub: &Term) -> bool {
        match self {
            Term::Compound(c) => c.components.contains(sub),
            _ => false,
        }
    }

    /// Reflexive-transitive containment through all compound levels.
    pub fn contains_term_recursively(&self, sub: &Term) -> bool {
        if let Term::Compound(c) = self {
            c.components
                .iter()
                .any(|t| t == sub || t.contains_term_recursively(sub))
        } else {
            false
        }
    }

    /// Canonical printable name; structural equality on terms is equality
    /// of names, and link keys are built from it.
    pub fn name(&self) -> String {
        format!("{self}")
    }
}

/// A statement `<subject copula predicate>` is invalid when it says
/// nothing (equal sides), bites its own tail (one side contains the
/// other as a component, images excepted), or mirrors another statement
/// pair with the sides swapped.
pub fn invalid_statement(subject: &Term, predicate: &Term) -> bool {
    if subject == predicate {
        return true;
    }
    if invalid_reflexive(subject, predicate) || invalid_reflexive(predicate, subject) {
        return true;
    }
    if let (Some(s1), Some(s2)) = (subject.as_statement(), predicate.as_statement()) {
        if s1.components[0] == s2.components[1] && s1.components[1] == s2.components[0] {
            return true;
        }
    }
    false
}

fn invalid_reflexive(container: &Term, sub: &Term) -> bool {
    match container.as_compound() {
        Some(c) if !c.op.is_image() => container.contains_component(sub),
        _ => false,
    }
}

/// Total structural order: variables < words < compounds; compounds by
/// arity, then operator, then components. The commutative canonicalizer
/// sorts and dedups with exactly this order.
impl Ord for Term {
    fn cmp(&self, other: &Term) -> Ordering {
        match (self, other) {
            (Term::Variable(k1, i1), Term::Variable(k2, i2)) => {
                k1.cmp(k2).then(i1.cmp(i2))
            }
            (Term::Variable(..), _) => Ordering::Less,
            (_, Term::Variable(..)) => Ordering::Greater,
            (Term::Word(a), Term::Word(b)) => a.cmp(b),
            (Term::Word(_), Term::Compound(_)) => Ordering::Less,
            (Term::Compound(_), Term::Word(_)) => Ordering::Greater,
            (Term::Compound(a), Term::Compound(b)) => a
                .size()
                .cmp(&b.size())
                .then(a.op.cmp(&b.op))
                .then_with(|| a.components.cmp(&b.components))
                .then(a.relation_index.cmp(&b.relation_index)),
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Term) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Word(w) => write!(f, "{w}"),
            Term::Variable(kind, id) => write!(f, "{}{id}", kind.prefix()),
            Term::Compound(c) => match c.op {
                TermOperator::SetExt | TermOperator::SetInt => {
                    let (open, close) = if c.op == TermOperator::SetExt {
                        ('{', '}')
                    } else {
                        ('[', ']')
                    };
                    write!(f, "{open}")?;
                    for (i, t) in c.components.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{t}")?;
                    }
                    write!(f, "{close}")
                }
                op if op.is_statement() => {
                    write!(
                        f,
                        "<{} {} {}>",
                        c.components[0],
                        op.symbol(),
                        c.components[1]
                    )
                }
                op if op.is_image() => {
                    // the relation lives at relation_index; it prints
                    // first and its slot shows the placeholder
                    write!(f, "({},{}", op.symbol(), c.components[c.relation_index])?;
                    for (i, t) in c.components.iter().enumerate() {
                        if i == c.relation_index {
                            write!(f, ",_")?;
                        } else {
                            write!(f, ",{t}")?;
                        }
                    }
                    write!(f, ")")
                }
                op => {
                    write!(f, "({}", op.symbol())?;
                    for t in &c.components {
                        write!(f, ",{t}")?;
                    }
                    write!(f, ")")
                }
            },
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make;

    fn w(s: &str) -> Term {
        Term::word(s)
    }

    #[test]
    fn test_complexity() {
        assert_eq!(w("bird").complexity(), 1);
        assert_eq!(Term::variable(VariableKind::Independent, 1).complexity(), 0);
        let st = make::make_inheritance(w("robin"), w("bird")).unwrap();
        assert_eq!(st.complexity(), 3);
        let nested = make::make_inheritance(st.clone(), w("truth")).unwrap();
        assert_eq!(nested.complexity(), 5);
    }

    #[test]
    fn test_order_variables_words_compounds() {
        let v = Term::variable(VariableKind::Independent, 1);
        let word = w("a");
        let comp = make::make_inheritance(w("a"), w("b")).unwrap();
        assert!(v < word);
        assert!(word < comp);
        assert!(v < comp);
    }

    #[test]
    fn test_order_compounds_by_arity_then_op() {
        let two = make::make_conjunction(vec![w("a"), w("b")]).unwrap();
        let three = make::make_conjunction(vec![w("a"), w("b"), w("c")]).unwrap();
        assert!(two < three);
        let inh = make::make_inheritance(w("a"), w("b")).unwrap();
        let sim = make::make_similarity(w("a"), w("b")).unwrap();
        assert!(inh < sim, "Inheritance tag orders before Similarity");
    }

    #[test]
    fn test_is_constant() {
        assert!(w("bird").is_constant());
        let v = Term::variable(VariableKind::Independent, 1);
        assert!(!v.is_constant());
        // a variable occurring once leaves the compound open
        let open = make::make_inheritance(v.clone(), w("bird")).unwrap();
        assert!(!open.is_constant());
        // the same variable on both sides of a conjunction closes it
        let left = make::make_inheritance(v.clone(), w("bird")).unwrap();
        let right = make::make_inheritance(v.clone(), w("animal")).unwrap();
        let law = make::make_conjunction(vec![left, right]).unwrap();
        assert!(law.is_constant());
        // query variables are exempt
        let q = Term::variable(VariableKind::Query, 1);
        let question = make::make_inheritance(q, w("bird")).unwrap();
        assert!(question.is_constant());
    }

    #[test]
    fn test_invalid_statement_equal_sides() {
        assert!(invalid_statement(&w("a"), &w("a")));
    }

    #[test]
    fn test_invalid_statement_reflexive() {
        let inner = make::make_intersection_ext(vec![w("a"), w("b")]).unwrap();
        assert!(invalid_statement(&inner, &w("a")));
        assert!(invalid_statement(&w("a"), &inner));
    }

    #[test]
    fn test_image_exempt_from_reflexive_check() {
        let relation = w("rel");
        let img = make::make_image_ext(vec![relation.clone(), w("b")], 0).unwrap();
        assert!(!invalid_statement(&img, &relation));
    }

    #[test]
    fn test_invalid_statement_swapped_pair() {
        let ab = make::make_inheritance(w("a"), w("b")).unwrap();
        let ba = make::make_inheritance(w("b"), w("a")).unwrap();
        assert!(invalid_statement(&ab, &ba));
        let ac = make::make_inheritance(w("a"), w("c")).unwrap();
        assert!(!invalid_statement(&ab, &ac));
    }

    #[test]
    fn test_contains_term_recursively() {
        let st = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let outer = make::make_implication(st.clone(), w("fact")).unwrap();
        assert!(outer.contains_term_recursively(&w("robin")));
        assert!(outer.contains_term_recursively(&st));
        assert!(!outer.contains_term_recursively(&w("fish")));
        assert!(!w("robin").contains_term_recursively(&w("robin")));
    }

    #[test]
    fn test_names() {
        let st = make::make_inheritance(w("robin"), w("bird")).unwrap();
        assert_eq!(st.name(), "<robin --> bird>");
        let set = make::make_set_ext(vec![w("tweety")]).unwrap();
        assert_eq!(set.name(), "{tweety}");
        let conj = make::make_conjunction(vec![w("b"), w("a")]).unwrap();
        assert_eq!(conj.name(), "(&&,a,b)");
        let v = Term::variable(VariableKind::Query, 3);
        assert_eq!(v.name(), "?3");
    }

    #[test]
    fn test_image_name_marks_elided_position() {
        let img = make::make_image_ext(vec![w("rel"), w("b")], 0).unwrap();
        assert_eq!(img.name(), "(/,rel,_,b)");
        let img = make::make_image_ext(vec![w("a"), w("rel")], 1).unwrap();
        assert_eq!(img.name(), "(/,rel,a,_)");
    }
}
