use std::fs;

use clap::Parser;
use owl_flattener::{
    cli::{self, Cli},
    flatten::FlattenReport,
    Error,
};

const ONTOLOGY: &str = r#"
@prefix obo: <http://purl.obolibrary.org/obo/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix dc: <http://purl.org/dc/elements/1.1/> .

obo:IAO_0000115 a owl:AnnotationProperty ; rdfs:label "definition" .
obo:IAO_0000233 a owl:AnnotationProperty .

obo:DOID_4 a owl:Class ; rdfs:label "disease" .

obo:DOID_7 a owl:Class ;
    rdfs:label "disease of anatomical entity" ;
    rdfs:subClassOf obo:DOID_4 .

obo:DOID_0001 a owl:Class ;
    rdfs:label "sample disease" ;
    rdfs:subClassOf obo:DOID_7 ;
    rdfs:subClassOf obo:UBERON_0002107 .

obo:DOID_0002 a owl:Class ;
    rdfs:label "hepatitis" ;
    obo:IAO_0000115 "An inflammation\nof the liver." ;
    rdfs:subClassOf obo:DOID_0001 ;
    rdfs:subClassOf [
        a owl:Restriction ;
        owl:onProperty obo:RO_0002452 ;
        owl:someValuesFrom obo:SYMP_0000613
    ] ;
    obo:IAO_0000233 "https://example.org/tracker/1" .

[] a owl:Axiom ;
    owl:annotatedSource obo:DOID_0002 ;
    owl:annotatedProperty obo:IAO_0000233 ;
    owl:annotatedTarget "https://example.org/tracker/1" ;
    dc:type obo:ECO_0000305 .

obo:DOID_0003 a owl:Class ;
    rdfs:label "obsolete hepatitis X" ;
    rdfs:subClassOf obo:DOID_0002 .

obo:DOID_0004 a owl:Class ;
    rdfs:label "cyclic disease" ;
    rdfs:subClassOf obo:DOID_0005 .

obo:DOID_0005 a owl:Class ;
    rdfs:label "other cyclic disease" ;
    rdfs:subClassOf obo:DOID_0004 .

obo:UBERON_0002107 a owl:Class ;
    rdfs:label "liver" ;
    rdfs:subClassOf obo:UBERON_0000062 ;
    rdfs:subClassOf [
        a owl:Restriction ;
        owl:onProperty obo:BFO_0000050 ;
        owl:someValuesFrom obo:UBERON_0000949
    ] .

obo:UBERON_0000062 a owl:Class ; rdfs:label "organ" .
obo:UBERON_0000949 a owl:Class ; rdfs:label "endocrine system" .
obo:SYMP_0000613 a owl:Class ; rdfs:label "jaundice" .
obo:ECO_0000305 rdfs:label "curator inference used in manual assertion" .
"#;

struct Run {
    records: String,
    report: FlattenReport,
}

fn flatten(ontology: &str, config: Option<&str>) -> Run {
    let mut builder = tree_fs::TreeBuilder::default()
        .drop(true)
        .add_file("doid.ttl", ontology);
    if let Some(config) = config {
        builder = builder.add_file("flattener.yaml", config);
    }
    let tree = builder.create().expect("create temp tree");
    let output = tree.root.join("records.json");

    let mut args = vec![
        "owl-flattener".to_string(),
        "--owl".to_string(),
        tree.root.join("doid.ttl").display().to_string(),
        "--root".to_string(),
        "DOID:4".to_string(),
        "--output".to_string(),
        output.display().to_string(),
    ];
    if config.is_some() {
        args.push("--config".to_string());
        args.push(tree.root.join("flattener.yaml").display().to_string());
    }
    let cli = Cli::try_parse_from(args).expect("valid arguments");
    let config = cli.load_config().expect("config");

    let report = cli::run(&cli, &config).expect("flattening succeeds");
    let records = fs::read_to_string(&output).expect("output written");
    Run { records, report }
}

#[test]
fn turtle_ontology_is_flattened() {
    let Run { records, report } = flatten(ONTOLOGY, None);

    insta::assert_snapshot!(records, @r#"
    { "create":{ } }
    {"id":"DOID:0001","name":"sample disease","anatomy":["organ","liver"]}
    { "create":{ } }
    {"id":"DOID:0002","name":"hepatitis","definition":"\"An inflammationof the liver.\"","anatomy":["organ","liver"],"evidence":["curator inference used in manual assertion"],"symptom":["jaundice"]}
    { "create":{ } }
    {"id":"DOID:0004","name":"cyclic disease"}
    { "create":{ } }
    {"id":"DOID:0005","name":"other cyclic disease"}
    { "create":{ } }
    {"id":"DOID:4","name":"disease"}
    { "create":{ } }
    {"id":"DOID:7","name":"disease of anatomical entity"}
    "#);

    assert_eq!(report.excluded_children, 1);
    assert_eq!(report.stats.considered, 7);
    assert_eq!(report.stats.obsolete, 1);
    assert_eq!(report.stats.written, 6);
    assert_eq!(report.stats.only_native_ancestors, 2);
    assert_eq!(report.stats.no_ancestors, 2);
    // the part_of restriction on the foreign liver term is not followed
    assert_eq!(report.diagnostics.skipped_restrictions, 1);
}

#[test]
fn configuration_file_is_honoured() {
    let Run { records, .. } = flatten(
        ONTOLOGY,
        Some("flatten:\n  quote_definitions: false\noutput:\n  action_line: '{\"index\":{}}'\n"),
    );

    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], r#"{"index":{}}"#);
    assert!(lines[3].contains(r#""definition":"An inflammationof the liver.""#));
}

#[test]
fn missing_ontology_fails_before_processing() {
    let tree = tree_fs::TreeBuilder::default()
        .drop(true)
        .create()
        .expect("create temp tree");
    let output = tree.root.join("records.json");
    let cli = Cli::try_parse_from([
        "owl-flattener".to_string(),
        "-i".to_string(),
        tree.root.join("missing.owl").display().to_string(),
        "-r".to_string(),
        "DOID:4".to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ])
    .expect("valid arguments");
    let config = cli.load_config().expect("config");

    let err = cli::run(&cli, &config).expect_err("missing input");
    assert!(matches!(err, Error::InputFile { .. }));
    assert!(!output.exists());
}
