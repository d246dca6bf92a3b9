
use fixtures::{chunk, crc32, listing, noise, split_chunks, text, PngBuilder};
use png_text_injector::{read_text, replace_text, Error, Field, TextChunk, TextEdits};

fn sample() -> Vec<u8> {
    PngBuilder::new(4, 3)
        .chunk(b"gAMA", &45455u32.to_be_bytes())
        .text("Author", "Jane Doe")
        .text("Comment", "old comment")
        .image_data(2)
        .text("Comment", "trailing comment")
        .end()
}

fn transcode(input: &[u8], edits: &TextEdits) -> Vec<u8> {
    let mut out = vec![];
    replace_text(input, &mut out, edits).unwrap();
    out
}

fn edits<const N: usize>(entries: [(&str, Option<&str>); N]) -> TextEdits {
    entries.into_iter().collect()
}

#[test]
fn empty_edits_copy_the_file_exactly() {
    let input = sample();
    assert_eq!(transcode(&input, &TextEdits::new()), input);
}

#[test]
fn new_comment_lands_after_ihdr() {
    let input = PngBuilder::new(2, 2).image_data(1).end();
    let out = transcode(&input, &edits([("Comment", Some("Test comment data."))]));

    let chunks = split_chunks(&out);
    assert_eq!(&chunks[0].chunk_type, b"IHDR");
    let comment = &chunks[1];
    assert_eq!(&comment.chunk_type, b"tEXt");
    assert_eq!(comment.data, b"Comment\0Test comment data.");
    let mut covered = b"tEXt".to_vec();
    covered.extend(&comment.data);
    assert_eq!(u32::from_be_bytes(comment.crc), crc32(&covered));
    assert_eq!(comment.to_bytes(), text(b"Comment", b"Test comment data."));

    let without_comment: Vec<_> = chunks.into_iter().filter(|c| !c.is_text()).collect();
    assert_eq!(without_comment, split_chunks(&input));
}

#[test]
fn replacing_twice_leaves_one_chunk() {
    let request = edits([("Comment", Some("Test comment data."))]);
    let once = transcode(&sample(), &request);
    let twice = transcode(&once, &request);

    assert_eq!(twice, once);
    let comments: Vec<_> = split_chunks(&twice)
        .into_iter()
        .filter(|c| c.keyword() == Some(&b"Comment"[..]))
        .collect();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text(), Some(&b"Test comment data."[..]));
}

#[test]
fn non_text_chunks_are_untouched() {
    let input = sample();
    let requests = [
        TextEdits::new(),
        edits([("Comment", None)]),
        edits([("Author", Some("someone else")), ("Comment", Some("x"))]),
        edits([("Title", Some("new")), ("Author", None), ("Comment", None)]),
    ];
    let expected: Vec<_> = split_chunks(&input)
        .into_iter()
        .filter(|c| !c.is_text())
        .map(|c| c.to_bytes())
        .collect();

    for request in &requests {
        let out = transcode(&input, request);
        let actual: Vec<_> = split_chunks(&out)
            .into_iter()
            .filter(|c| !c.is_text())
            .map(|c| c.to_bytes())
            .collect();
        assert_eq!(actual, expected, "edits: {request:?}");
    }
}

#[test]
fn removal_drops_every_copy_and_keeps_order() {
    let out = transcode(&sample(), &edits([("Comment", None)]));
    insta::assert_snapshot!(listing(&out), @r###"
    IHDR
    gAMA
    tEXt Author=Jane Doe
    IDAT
    IDAT
    IEND
    "###);
}

#[test]
fn replacement_is_written_once_before_the_rest() {
    let out = transcode(
        &sample(),
        &edits([("Comment", Some("Test comment data.")), ("Title", None)]),
    );
    insta::assert_snapshot!(listing(&out), @r###"
    IHDR
    tEXt Comment=Test comment data.
    gAMA
    tEXt Author=Jane Doe
    IDAT
    IDAT
    IEND
    "###);
}

#[test]
fn untargeted_text_keeps_its_original_crc() {
    // A deliberately wrong CRC proves the chunk is copied, not rebuilt.
    let mut author = text(b"Author", b"Jane Doe");
    let len = author.len();
    author[len - 4..].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    let mut input = PngBuilder::new(1, 1).into_bytes();
    input.extend(&author);
    input.extend(chunk(b"IEND", &[]));

    let out = transcode(&input, &edits([("Comment", Some("x"))]));
    let copied = split_chunks(&out)
        .into_iter()
        .find(|c| c.keyword() == Some(&b"Author"[..]))
        .unwrap();
    assert_eq!(copied.to_bytes(), author);
}

#[test]
fn keyword_prefixes_are_not_confused() {
    let input = PngBuilder::new(1, 1)
        .text("Comments", "plural")
        .text("Comment", "singular")
        .end();
    let out = transcode(&input, &edits([("Comment", None)]));
    let keywords: Vec<_> = split_chunks(&out)
        .iter()
        .filter_map(|c| c.keyword().map(<[u8]>::to_vec))
        .collect();
    assert_eq!(keywords, [b"Comments".to_vec()]);
}

#[test]
fn removal_only_edit_emits_nothing() {
    let input = PngBuilder::new(1, 1).image_data(1).end();
    let out = transcode(&input, &edits([("Comment", None)]));
    assert_eq!(out, input);
}

#[test]
fn edits_are_emitted_in_insertion_order() {
    let input = PngBuilder::new(1, 1).end();
    let mut request = TextEdits::new();
    request
        .set("Title", "t")
        .remove("Software")
        .set("Author", "a")
        .set("Description", "d");
    let out = transcode(&input, &request);
    insta::assert_snapshot!(listing(&out), @r###"
    IHDR
    tEXt Title=t
    tEXt Author=a
    tEXt Description=d
    IEND
    "###);
}

#[test]
fn latin1_text_is_single_byte_on_disk() {
    let input = PngBuilder::new(1, 1)
        .chunk(b"tEXt", b"Sch\xf6pfer\0old")
        .end();
    let out = transcode(&input, &edits([("Schöpfer", Some("Zoë"))]));
    let texts: Vec<_> = split_chunks(&out).into_iter().filter(|c| c.is_text()).collect();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].data, b"Sch\xf6pfer\0Zo\xeb");

    assert_eq!(
        read_text(out.as_slice()).unwrap(),
        [TextChunk::new("Schöpfer", "Zoë")]
    );
}

#[test]
fn large_image_chunks_pass_through() {
    let big = noise(3 * 1024 * 1024 + 17);
    let input = PngBuilder::new(1024, 1024)
        .chunk(b"IDAT", &big)
        .chunk(b"IDAT", &big[..1000])
        .end();
    let out = transcode(&input, &edits([("Comment", Some("big"))]));
    let header_len = 8 + 25;
    let comment_len = text(b"Comment", b"big").len();
    assert_eq!(&out[..header_len], &input[..header_len]);
    assert_eq!(&out[header_len + comment_len..], &input[header_len..]);
}

#[test]
fn truncated_chunk_data_is_an_error() {
    let mut input = sample();
    // Cut into the first IDAT's data field.
    let idat_start = input.windows(4).position(|w| w == b"IDAT").unwrap() + 4;
    input.truncate(idat_start + 3);

    let mut out = vec![];
    let request = edits([("Comment", Some("x"))]);
    let err = replace_text(input.as_slice(), &mut out, &request).unwrap_err();
    assert!(
        matches!(
            err,
            Error::TruncatedInput {
                field: Field::Data,
                read: 3,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn truncated_crc_of_a_dropped_chunk_is_an_error() {
    let mut input = PngBuilder::new(1, 1).text("Comment", "old").into_bytes();
    input.truncate(input.len() - 2);

    let mut out = vec![];
    let err = replace_text(input.as_slice(), &mut out, &edits([("Comment", None)])).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            field: Field::Crc,
            expected: 4,
            read: 2
        }
    ));
}

#[test]
fn stray_bytes_after_the_last_chunk_are_an_error() {
    let mut input = sample();
    input.push(0);
    let mut out = vec![];
    let err = replace_text(input.as_slice(), &mut out, &TextEdits::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            field: Field::Length,
            expected: 4,
            read: 1
        }
    ));
}

#[test]
fn stream_may_end_on_any_chunk_boundary() {
    let input = PngBuilder::new(1, 1).image_data(1).into_bytes();
    assert_eq!(transcode(&input, &TextEdits::new()), input);
}

#[test]
fn unencodable_value_fails_before_writing() {
    let mut out = vec![];
    let err = replace_text(
        sample().as_slice(),
        &mut out,
        &edits([("Comment", Some("fine")), ("Title", Some("snowman ☃"))]),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Encoding { ref keyword, character: '☃' } if keyword == "Title"
    ));
    assert!(out.is_empty());
}

#[test]
fn read_text_lists_chunks_in_order() {
    assert_eq!(
        read_text(sample().as_slice()).unwrap(),
        [
            TextChunk::new("Author", "Jane Doe"),
            TextChunk::new("Comment", "old comment"),
            TextChunk::new("Comment", "trailing comment"),
        ]
    );
}
