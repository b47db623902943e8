//! Feeding a document in pieces must not change what comes out.

use proptest::prelude::*;
use proptest::sample::Index;

use tagpath::sax::Variable;
use tagpath::strategy::variable_parser;

const DOCUMENTS: &[&str] = &[
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
     <!DOCTYPE note [\n  <!ENTITY x \"y\">\n  <!ELEMENT note (#PCDATA)>\n]>\n\
     <note lang='en' title=\"a > b\">Caf\u{e9} &amp; cr\u{e8}me &#x263A; &#169;\
     <!-- a <b> comment --><![CDATA[ <raw> & ]]></note>\n",
    "<Parking>\n  <Carpark>\n    <SystemCodeNumber>BATH-01</SystemCodeNumber>\n    \
     <Capacity>630</Capacity>\n  </Carpark>\n  <Carpark>\n    \
     <SystemCodeNumber>BATH-02</SystemCodeNumber>\n  </Carpark>\n</Parking>\n",
    "<html><head><title>A&nbsp;page</title></head><body>\
     <p>1 < 2 &bogus; <a href=\"x?a=1&amp;b=2\">link</a> tail</p><br/></body></html>",
    "<p>one<b>two</b>three<br/>four<i k=\"v\" j='w'/>five</p>",
    "<r><?php echo 1 ?><x y=\"1\"/>\u{1F600}<x y=\"2\"></x></r>",
];

fn parse_whole(document: &str) -> Vec<Variable> {
    let mut parser = variable_parser(Vec::new());
    parser.parse_str(document).expect("whole document parses");
    parser.into_variables()
}

fn parse_pieces(document: &[u8], cuts: &[usize]) -> Vec<Variable> {
    let mut parser = variable_parser(Vec::new());
    parser.start().expect("start");
    let mut from = 0;
    for &cut in cuts.iter().chain(std::iter::once(&document.len())) {
        parser.feed(&document[from..cut]).expect("feed");
        from = cut;
    }
    parser.finish().expect("finish");
    parser.into_variables()
}

#[test]
fn byte_at_a_time_matches_whole() {
    for document in DOCUMENTS {
        let cuts: Vec<usize> = (1..document.len()).collect();
        assert_eq!(parse_pieces(document.as_bytes(), &cuts), parse_whole(document));
    }
}

#[test]
fn repeated_parses_are_identical() {
    for document in DOCUMENTS {
        assert_eq!(parse_whole(document), parse_whole(document));
    }
}

#[test]
fn entities_and_sections_decoded() {
    let vars = parse_whole(DOCUMENTS[0]);
    assert!(vars.contains(&Variable::new("/note/title", "a > b")));
    assert!(vars.contains(&Variable::new(
        "/note/",
        "Caf\u{e9} & cr\u{e8}me \u{263A} \u{a9} <raw> &"
    )));
}

#[test]
fn unknown_entity_and_stray_kept_as_text() {
    let vars = parse_whole(DOCUMENTS[2]);
    assert!(vars.contains(&Variable::new("/html/head/title/", "A\u{a0}page")));
    assert!(vars.contains(&Variable::new("/html/body/p/", "1 < 2 &bogus;")));
    assert!(vars.contains(&Variable::new("/html/body/p/a/href", "x?a=1&b=2")));
}

#[test]
fn stray_lt_split_right_after_it() {
    let document = "<a>1 < 2</a>";
    let split = {
        let mut parser = variable_parser(Vec::new());
        parser.parse_from(["<a>1 <", " ", "2</a>"]).expect("split parse");
        parser.into_variables()
    };
    assert_eq!(split, parse_whole(document));
    assert!(split.contains(&Variable::new("/a/", "1 < 2")));
}

#[test]
fn doctype_subset_with_comment_fed_in_pieces() {
    let document = "<!DOCTYPE r [\n  <!-- don't -->\n  <!ELEMENT r (#PCDATA)>\n]>\n<r>x</r>";
    let cuts: Vec<usize> = (1..document.len()).collect();
    assert_eq!(parse_pieces(document.as_bytes(), &cuts), parse_whole(document));
    assert!(parse_whole(document).contains(&Variable::new("/r/", "x")));
}

proptest! {
    #[test]
    fn any_partition_matches_whole(
        index in 0..DOCUMENTS.len(),
        picks in prop::collection::vec(any::<Index>(), 0..16),
    ) {
        let document = DOCUMENTS[index];
        let bytes = document.as_bytes();
        let mut cuts: Vec<usize> = picks
            .iter()
            .map(|pick| pick.index(bytes.len()))
            .filter(|&cut| cut > 0)
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        prop_assert_eq!(parse_pieces(bytes, &cuts), parse_whole(document));
    }
}
