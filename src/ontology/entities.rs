use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use super::value_objects::{Iri, TermId};

/// A named class of the ontology together with the annotation facts the
/// flattener needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    id: TermId,
    labels: Vec<String>,
    deprecated: bool,
    declared: bool,
    annotations: Vec<Annotation>,
}

impl Term {
    /// Creates an undeclared [`Term`] with the supplied identifier.
    #[must_use]
    pub fn new(id: TermId) -> Self {
        Self {
            id,
            labels: Vec::new(),
            deprecated: false,
            declared: false,
            annotations: Vec::new(),
        }
    }

    /// Adds a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Marks the term as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn mark_deprecated(&mut self) {
        self.deprecated = true;
    }

    pub fn mark_declared(&mut self) {
        self.declared = true;
    }

    /// Returns the unique identifier of the term.
    #[must_use]
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// Returns the first label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Returns the first label that does not carry the obsolescence marker.
    #[must_use]
    pub fn current_label(&self, obsolete_prefix: &str) -> Option<&str> {
        self.labels
            .iter()
            .map(String::as_str)
            .find(|label| !label.starts_with(obsolete_prefix))
    }

    /// A term is obsolete when it is deprecated or any of its labels starts
    /// with the obsolescence marker.
    #[must_use]
    pub fn is_obsolete(&self, obsolete_prefix: &str) -> bool {
        self.deprecated
            || self
                .labels
                .iter()
                .any(|label| label.starts_with(obsolete_prefix))
    }

    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Whether the ontology declares the term as a class.
    #[must_use]
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the first literal annotation value for `property`.
    #[must_use]
    pub fn literal(&self, property: &Iri) -> Option<&str> {
        self.annotations
            .iter()
            .filter(|annotation| &annotation.property == property)
            .find_map(|annotation| annotation.value.as_literal())
    }
}

/// Property/value pair attached to a term or to another annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub property: Iri,
    pub value: AnnotationValue,
}

impl Annotation {
    #[must_use]
    pub fn new(property: Iri, value: AnnotationValue) -> Self {
        Self { property, value }
    }
}

/// Value side of an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    Literal(String),
    Iri(Iri),
}

impl AnnotationValue {
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Iri(_) => None,
        }
    }

    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Literal(_) => None,
        }
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value:?}"),
            Self::Iri(iri) => write!(f, "<{iri}>"),
        }
    }
}

/// `AnnotationAssertion(property subject value)` with its own annotations
/// (axiom annotations, e.g. an evidence code tag).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationAssertion {
    pub subject: TermId,
    pub property: Iri,
    pub value: AnnotationValue,
    pub annotations: Vec<Annotation>,
}

impl AnnotationAssertion {
    #[must_use]
    pub fn new(subject: TermId, property: Iri, value: AnnotationValue) -> Self {
        Self {
            subject,
            property,
            value,
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Values of the axiom annotations made with `property`.
    pub fn annotation_values<'a>(
        &'a self,
        property: &'a Iri,
    ) -> impl Iterator<Item = &'a AnnotationValue> + 'a {
        self.annotations
            .iter()
            .filter(move |annotation| &annotation.property == property)
            .map(|annotation| &annotation.value)
    }
}

/// OWL class expression. Shapes the loader cannot map are kept as
/// [`ClassExpression::Opaque`] with their textual form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassExpression {
    Class(TermId),
    SomeValuesFrom {
        property: Iri,
        filler: Box<ClassExpression>,
    },
    AllValuesFrom {
        property: Iri,
        filler: Box<ClassExpression>,
    },
    MinCardinality {
        property: Iri,
        cardinality: u32,
        filler: Box<ClassExpression>,
    },
    ExactCardinality {
        property: Iri,
        cardinality: u32,
        filler: Box<ClassExpression>,
    },
    MaxCardinality {
        property: Iri,
        cardinality: u32,
        filler: Box<ClassExpression>,
    },
    IntersectionOf(Vec<ClassExpression>),
    UnionOf(Vec<ClassExpression>),
    ComplementOf(Box<ClassExpression>),
    Opaque(String),
}

impl ClassExpression {
    #[must_use]
    pub fn class(id: TermId) -> Self {
        Self::Class(id)
    }

    #[must_use]
    pub fn some(property: Iri, filler: Self) -> Self {
        Self::SomeValuesFrom {
            property,
            filler: Box::new(filler),
        }
    }

    /// Returns the identifier when the expression is a named class.
    #[must_use]
    pub fn as_class(&self) -> Option<&TermId> {
        match self {
            Self::Class(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the expression is the named class `id`.
    #[must_use]
    pub fn denotes(&self, id: &TermId) -> bool {
        self.as_class() == Some(id)
    }

    /// Collects every named class mentioned anywhere in the expression.
    pub fn collect_classes(&self, out: &mut BTreeSet<TermId>) {
        match self {
            Self::Class(id) => {
                out.insert(id.clone());
            }
            Self::SomeValuesFrom { filler, .. }
            | Self::AllValuesFrom { filler, .. }
            | Self::MinCardinality { filler, .. }
            | Self::ExactCardinality { filler, .. }
            | Self::MaxCardinality { filler, .. } => filler.collect_classes(out),
            Self::IntersectionOf(operands) | Self::UnionOf(operands) => {
                for operand in operands {
                    operand.collect_classes(out);
                }
            }
            Self::ComplementOf(operand) => operand.collect_classes(out),
            Self::Opaque(_) => {}
        }
    }
}

impl Display for ClassExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "{id}"),
            Self::SomeValuesFrom { property, filler } => {
                write!(f, "ObjectSomeValuesFrom(<{property}> {filler})")
            }
            Self::AllValuesFrom { property, filler } => {
                write!(f, "ObjectAllValuesFrom(<{property}> {filler})")
            }
            Self::MinCardinality {
                property,
                cardinality,
                filler,
            } => write!(f, "ObjectMinCardinality({cardinality} <{property}> {filler})"),
            Self::ExactCardinality {
                property,
                cardinality,
                filler,
            } => write!(
                f,
                "ObjectExactCardinality({cardinality} <{property}> {filler})"
            ),
            Self::MaxCardinality {
                property,
                cardinality,
                filler,
            } => write!(f, "ObjectMaxCardinality({cardinality} <{property}> {filler})"),
            Self::IntersectionOf(operands) => {
                f.write_str("ObjectIntersectionOf(")?;
                write_operands(f, operands)?;
                f.write_str(")")
            }
            Self::UnionOf(operands) => {
                f.write_str("ObjectUnionOf(")?;
                write_operands(f, operands)?;
                f.write_str(")")
            }
            Self::ComplementOf(operand) => write!(f, "ObjectComplementOf({operand})"),
            Self::Opaque(description) => f.write_str(description),
        }
    }
}

fn write_operands(f: &mut Formatter<'_>, operands: &[ClassExpression]) -> fmt::Result {
    for (index, operand) in operands.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{operand}")?;
    }
    Ok(())
}

/// The axioms the ontology store hands out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Axiom {
    Declaration(TermId),
    SubClassOf {
        sub: ClassExpression,
        sup: ClassExpression,
    },
    EquivalentClasses(Vec<ClassExpression>),
    DisjointClasses(Vec<ClassExpression>),
    AnnotationAssertion(AnnotationAssertion),
}

impl Axiom {
    #[must_use]
    pub fn subclass_of(sub: ClassExpression, sup: ClassExpression) -> Self {
        Self::SubClassOf { sub, sup }
    }

    /// Named classes the axiom mentions; the store indexes the axiom under
    /// each of them.
    #[must_use]
    pub fn signature(&self) -> BTreeSet<TermId> {
        let mut out = BTreeSet::new();
        match self {
            Self::Declaration(id) => {
                out.insert(id.clone());
            }
            Self::SubClassOf { sub, sup } => {
                sub.collect_classes(&mut out);
                sup.collect_classes(&mut out);
            }
            Self::EquivalentClasses(members) | Self::DisjointClasses(members) => {
                for member in members {
                    member.collect_classes(&mut out);
                }
            }
            Self::AnnotationAssertion(assertion) => {
                out.insert(assertion.subject.clone());
            }
        }
        out
    }

    /// Rewrites the axiom as `(sub, super)` statements: one for a subclass
    /// axiom, every ordered pair of distinct members for an equivalence.
    #[must_use]
    pub fn as_subclass_statements(&self) -> Vec<(&ClassExpression, &ClassExpression)> {
        match self {
            Self::SubClassOf { sub, sup } => vec![(sub, sup)],
            Self::EquivalentClasses(members) => {
                let mut statements = Vec::new();
                for (i, sub) in members.iter().enumerate() {
                    for (j, sup) in members.iter().enumerate() {
                        if i != j {
                            statements.push((sub, sup));
                        }
                    }
                }
                statements
            }
            Self::Declaration(_) | Self::DisjointClasses(_) | Self::AnnotationAssertion(_) => {
                Vec::new()
            }
        }
    }
}

impl Display for Axiom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(id) => write!(f, "Declaration(Class({id}))"),
            Self::SubClassOf { sub, sup } => write!(f, "SubClassOf({sub} {sup})"),
            Self::EquivalentClasses(members) => {
                f.write_str("EquivalentClasses(")?;
                write_operands(f, members)?;
                f.write_str(")")
            }
            Self::DisjointClasses(members) => {
                f.write_str("DisjointClasses(")?;
                write_operands(f, members)?;
                f.write_str(")")
            }
            Self::AnnotationAssertion(assertion) => write!(
                f,
                "AnnotationAssertion(<{}> {} {})",
                assertion.property, assertion.subject, assertion.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{Axiom, ClassExpression, Term};
    use crate::ontology::value_objects::{Iri, TermId};

    fn id(text: &str) -> TermId {
        TermId::parse(text).expect("valid id")
    }

    fn has_location() -> Iri {
        Iri::new("http://purl.obolibrary.org/obo/RO_0001025").expect("valid iri")
    }

    #[test]
    fn obsolete_terms_are_detected_by_flag_or_label() {
        let deprecated = Term::new(id("DOID:1")).with_label("disease").deprecated();
        let relabelled = Term::new(id("DOID:2")).with_label("obsolete disease");
        let current = Term::new(id("DOID:3")).with_label("disease");

        assert!(deprecated.is_obsolete("obsolete "));
        assert!(relabelled.is_obsolete("obsolete "));
        assert!(!current.is_obsolete("obsolete "));
        assert_eq!(relabelled.current_label("obsolete "), None);
        assert_eq!(current.current_label("obsolete "), Some("disease"));
    }

    #[test]
    fn signature_reaches_into_nested_expressions() {
        let axiom = Axiom::subclass_of(
            ClassExpression::class(id("DOID:1")),
            ClassExpression::IntersectionOf(vec![
                ClassExpression::class(id("DOID:2")),
                ClassExpression::some(has_location(), ClassExpression::class(id("UBERON:3"))),
            ]),
        );

        assert_eq!(
            axiom.signature(),
            BTreeSet::from([id("DOID:1"), id("DOID:2"), id("UBERON:3")])
        );
    }

    #[test]
    fn equivalence_expands_to_ordered_pairs() {
        let a = ClassExpression::class(id("DOID:1"));
        let b = ClassExpression::class(id("DOID:2"));
        let c = ClassExpression::class(id("DOID:3"));
        let axiom = Axiom::EquivalentClasses(vec![a.clone(), b.clone(), c]);

        let statements = axiom.as_subclass_statements();
        assert_eq!(statements.len(), 6);
        assert!(statements.contains(&(&a, &b)));
        assert!(statements.contains(&(&b, &a)));
    }

    #[test]
    fn display_uses_functional_syntax() {
        let axiom = Axiom::subclass_of(
            ClassExpression::class(id("DOID:1")),
            ClassExpression::some(has_location(), ClassExpression::class(id("UBERON:3"))),
        );
        assert_eq!(
            axiom.to_string(),
            "SubClassOf(DOID:1 ObjectSomeValuesFrom(<http://purl.obolibrary.org/obo/RO_0001025> UBERON:3))"
        );
    }
}
