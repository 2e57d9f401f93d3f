use pileup_stats::pileup::AlignedRead;
use pileup_stats::stats::registry::Schema;
use pileup_stats::{
    lookup, stat_pileup, ColumnKind, MemoryAlignments, MemoryReference, PileupOptions,
    ReferenceSource, Region, Result, StatRecord, StatType, StatsError, Value,
};
use rstest::rstest;
use rust_htslib::bam::record::Cigar;
use rust_htslib::htslib::{BAM_FPAIRED, BAM_FPROPER_PAIR, BAM_FREVERSE};

const PATTERN: &[u8] = b"AACCGGTTAACC";

fn reference_seq() -> Vec<u8> {
    PATTERN.repeat(20)
}

fn reference() -> MemoryReference {
    MemoryReference::new().with_sequence("chrom1", &reference_seq())
}

/// A single five-base read covering `[100, 105)`.
fn alignments() -> MemoryAlignments {
    MemoryAlignments::new(&[("chrom1", 240)]).with_read(AlignedRead::new(0, 100, b"ACGTA"))
}

fn region(start: i64, end: i64) -> Region {
    Region::new("chrom1", Some(start), Some(end))
}

fn collect(
    stat: &str,
    alignments: &mut MemoryAlignments,
    reference: Option<&mut MemoryReference>,
    options: &PileupOptions,
) -> Result<Vec<StatRecord>> {
    let reference = reference.map(|r| r as &mut dyn ReferenceSource);
    stat_pileup(stat, alignments, reference, options)?.collect()
}

fn positions(records: &[StatRecord]) -> Vec<i64> {
    records.iter().map(StatRecord::pos).collect()
}

#[test]
fn scenario_a_pads_around_a_single_read() {
    let options = PileupOptions::default()
        .with_region("chrom1:95-110".parse().unwrap())
        .with_pad(true);
    let records = collect("coverage", &mut alignments(), None, &options).unwrap();

    assert_eq!(positions(&records), (95..110).collect::<Vec<_>>());
    for r in &records {
        let expected = if (100..105).contains(&r.pos()) { 1 } else { 0 };
        assert_eq!(r.chrom(), "chrom1");
        assert_eq!(r.count("reads_all"), Some(expected), "pos {}", r.pos());
    }
}

#[test]
fn scenario_b_gc_uses_offset_window() {
    let options = PileupOptions::default()
        .with_region(region(95, 110))
        .with_pad(true)
        .with_window(4, Some(2));
    let mut reference = reference();
    let records = collect("coverage_gc", &mut alignments(), Some(&mut reference), &options).unwrap();
    assert_eq!(records.len(), 15);

    let seq = reference_seq();
    for r in &records {
        let p = r.pos() as usize;
        let window = &seq[p - 2..p + 2];
        let gc = window.iter().filter(|b| matches!(b, b'G' | b'C')).count();
        let expected = (gc as f64 * 100.0 / 4.0).round() as i64;
        let got = r.count("gc").unwrap();
        assert_eq!(got, expected, "pos {}", p);
        assert!((0..=100).contains(&got));
    }
}

#[test]
fn scenario_b_window_is_clamped_at_contig_start() {
    let options = PileupOptions::default()
        .with_region(region(0, 4))
        .with_pad(true)
        .with_truncate(true)
        .with_window(4, Some(2));
    let mut reference = reference();
    let records = collect("coverage_gc", &mut alignments(), Some(&mut reference), &options).unwrap();
    let gc: Vec<i64> = records.iter().map(|r| r.count("gc").unwrap()).collect();
    // AA, AAC, AACC, ACCG
    assert_eq!(gc, vec![0, 33, 50, 75]);
}

#[test]
fn scenario_c_unknown_type_fails_before_iteration() {
    let mut source = alignments();
    let err = stat_pileup("bogus", &mut source, None, &PileupOptions::default());
    assert!(matches!(err, Err(StatsError::UnsupportedType(t)) if t == "bogus"));
}

#[test]
fn scenario_d_variation_needs_reference() {
    let options = PileupOptions::default().with_region(region(95, 110));
    let mut source = alignments();
    let err = stat_pileup("variation", &mut source, None, &options);
    assert!(matches!(err, Err(StatsError::MissingReference(_))));
}

#[test]
fn validation_order_is_type_window_reference_region() {
    let bad_region = PileupOptions::default()
        .with_region(Region::whole("chrX"))
        .with_window(0, None);
    let mut source = alignments();

    assert!(matches!(
        stat_pileup("bogus", &mut source, None, &bad_region),
        Err(StatsError::UnsupportedType(_))
    ));
    assert!(matches!(
        stat_pileup("coverage_gc", &mut source, None, &bad_region),
        Err(StatsError::InvalidWindowConfig(_))
    ));

    let bad_region = bad_region.with_window(10, None);
    assert!(matches!(
        stat_pileup("coverage_gc", &mut source, None, &bad_region),
        Err(StatsError::MissingReference(_))
    ));

    let mut reference = reference();
    assert!(matches!(
        stat_pileup("coverage_gc", &mut source, Some(&mut reference), &bad_region),
        Err(StatsError::InvalidRegion(_))
    ));
}

#[rstest]
#[case("coverage")]
#[case("coverage_strand")]
#[case("coverage_ext")]
#[case("coverage_ext_strand")]
#[case("variation")]
#[case("variation_strand")]
#[case("tlen")]
#[case("tlen_strand")]
#[case("mapq")]
#[case("mapq_strand")]
#[case("baseq")]
#[case("baseq_strand")]
#[case("baseq_ext")]
#[case("baseq_ext_strand")]
#[case("coverage_gc")]
fn build_and_pad_records_share_fields(#[case] stat: &str) {
    let options = PileupOptions::default()
        .with_region(region(98, 102))
        .with_pad(true)
        .with_truncate(true);
    let mut reference = reference();
    let records = collect(stat, &mut alignments(), Some(&mut reference), &options).unwrap();
    assert_eq!(positions(&records), vec![98, 99, 100, 101]);

    let kinds = |r: &StatRecord| r.values().iter().map(Value::kind).collect::<Vec<ColumnKind>>();
    let (pad, built) = (&records[0], &records[2]);
    assert_eq!(pad.fields(), built.fields());
    assert_eq!(kinds(pad), kinds(built));
    assert_eq!(&pad.fields()[..2], &["chrom".to_string(), "pos".to_string()]);

    if stat != "coverage_gc" {
        let schema = lookup(stat).unwrap();
        assert_eq!(&schema.fields()[..], pad.fields());
    }
}

#[test]
fn every_type_name_resolves() {
    for stat in StatType::ALL {
        let registered = lookup(stat.name());
        if stat == StatType::CoverageGc {
            assert!(registered.is_err());
        } else {
            assert_eq!(registered.unwrap().stat_type(), stat);
        }
    }
}

#[rstest]
#[case(0, 240)]
#[case(95, 110)]
#[case(102, 103)]
#[case(200, 240)]
fn pad_visits_each_position_once(#[case] start: i64, #[case] end: i64) {
    let options = PileupOptions::default()
        .with_region(region(start, end))
        .with_pad(true)
        .with_truncate(true);
    let records = collect("coverage", &mut alignments(), None, &options).unwrap();
    assert_eq!(positions(&records), (start..end).collect::<Vec<_>>());
}

#[test]
fn without_pad_only_covered_positions_appear() {
    let options = PileupOptions::default().with_region(region(50, 150));
    let records = collect("coverage", &mut alignments(), None, &options).unwrap();
    assert_eq!(positions(&records), vec![100, 101, 102, 103, 104]);
    assert!(records.iter().all(|r| r.count("reads_all").unwrap() > 0));
}

#[test]
fn truncate_limits_records_to_region() {
    let options = PileupOptions::default().with_region(region(102, 110));
    let untruncated = collect("coverage", &mut alignments(), None, &options).unwrap();
    assert_eq!(positions(&untruncated), vec![100, 101, 102, 103, 104]);

    let options = options.with_truncate(true);
    let truncated = collect("coverage", &mut alignments(), None, &options).unwrap();
    assert_eq!(positions(&truncated), vec![102, 103, 104]);
}

#[test]
fn max_depth_keeps_first_segments_in_provider_order() {
    let stacked = |n: usize| {
        let mut source = MemoryAlignments::new(&[("chrom1", 240)]);
        for i in 0..n {
            source.push(AlignedRead::new(0, 10, b"A").with_mapq(10 * (i as u8 + 1)));
        }
        source
    };
    let options = PileupOptions::default().with_region(region(10, 11));

    let capped = collect("mapq", &mut stacked(5), None, &options.clone().with_max_depth(3)).unwrap();
    let exact = collect("mapq", &mut stacked(3), None, &options).unwrap();
    assert_eq!(capped, exact);
    assert_eq!(capped[0].count("reads_all"), Some(3));
    assert_eq!(capped[0].count("max_mapq"), Some(30));
}

#[test]
fn one_based_output_is_shifted_by_one() {
    let zero = PileupOptions::default().with_region(region(95, 110)).with_pad(true);
    let one = PileupOptions::default()
        .with_one_based(true)
        .with_region(region(96, 110))
        .with_pad(true);

    let a = collect("coverage", &mut alignments(), None, &zero).unwrap();
    let b = collect("coverage", &mut alignments(), None, &one).unwrap();
    assert_eq!(a.len(), b.len());
    for (a, b) in a.iter().zip(&b) {
        assert_eq!(a.pos() + 1, b.pos());
        assert_eq!(a.count("reads_all"), b.count("reads_all"));
    }

    let whole = PileupOptions::default().with_one_based(true);
    let c = collect("coverage", &mut alignments(), None, &whole).unwrap();
    assert_eq!(positions(&c), vec![101, 102, 103, 104, 105]);
}

#[test]
fn one_based_applies_regardless_of_builder_order() {
    let before = PileupOptions::default()
        .with_one_based(true)
        .with_region(region(101, 103))
        .with_truncate(true);
    let after = PileupOptions::default()
        .with_region(region(101, 103))
        .with_truncate(true)
        .with_one_based(true);

    let a = collect("coverage", &mut alignments(), None, &before).unwrap();
    let b = collect("coverage", &mut alignments(), None, &after).unwrap();
    assert_eq!(a, b);
    assert_eq!(positions(&a), vec![101, 102, 103]);
}

#[rstest]
#[case("variation")]
#[case("variation_strand")]
#[case("baseq_ext")]
#[case("coverage_gc")]
fn reference_without_walked_contig_is_rejected(#[case] stat: &str) {
    let mut reference = MemoryReference::new().with_sequence("1", &reference_seq());

    let options = PileupOptions::default().with_region(region(95, 110));
    let mut source = alignments();
    let err = collect(stat, &mut source, Some(&mut reference), &options);
    assert!(matches!(err, Err(StatsError::InvalidRegion(msg)) if msg.contains("chrom1")));

    let mut source = alignments();
    let err = collect(stat, &mut source, Some(&mut reference), &PileupOptions::default());
    assert!(matches!(err, Err(StatsError::InvalidRegion(_))));
}

#[test]
fn reference_contigs_are_not_checked_for_coverage() {
    let mut reference = MemoryReference::new().with_sequence("1", &reference_seq());
    let options = PileupOptions::default().with_region(region(95, 110));
    let records = collect("coverage", &mut alignments(), Some(&mut reference), &options).unwrap();
    assert_eq!(records.len(), 5);
}

#[test]
fn coverage_ext_extends_coverage() {
    let options = PileupOptions::default().with_region(region(95, 110)).with_pad(true);
    let mut source = alignments()
        .with_read(AlignedRead::new(0, 101, b"CC").with_flags((BAM_FPAIRED | BAM_FPROPER_PAIR) as u16));

    let plain = collect("coverage", &mut source, None, &options).unwrap();
    let ext = collect("coverage_ext", &mut source, None, &options).unwrap();

    for (p, e) in plain.iter().zip(&ext) {
        for (field, value) in p.iter() {
            assert_eq!(e.get(field), Some(value), "{} at {}", field, p.pos());
        }
    }
    assert!(ext[0].fields().len() > plain[0].fields().len());
}

#[test]
fn variation_compares_against_reference() {
    let options = PileupOptions::default().with_region(region(100, 105));
    let mut reference = reference();
    let records = collect("variation", &mut alignments(), Some(&mut reference), &options).unwrap();

    // reference at [100, 105) is GGTTA, read is ACGTA
    let refs: Vec<Value> = records.iter().map(|r| r.get("ref").unwrap().clone()).collect();
    assert_eq!(refs, "GGTTA".chars().map(Value::Base).collect::<Vec<_>>());
    let matches: Vec<i64> = records.iter().map(|r| r.count("matches").unwrap()).collect();
    assert_eq!(matches, vec![0, 0, 0, 1, 1]);
    assert_eq!(records[0].count("A"), Some(1));
    assert_eq!(records[0].count("mismatches"), Some(1));
}

#[test]
fn variation_pad_record_carries_reference_base() {
    let options = PileupOptions::default()
        .with_region(region(0, 3))
        .with_pad(true)
        .with_truncate(true);
    let mut reference = reference();
    let records = collect("variation", &mut alignments(), Some(&mut reference), &options).unwrap();
    let refs: Vec<Option<&Value>> = records.iter().map(|r| r.get("ref")).collect();
    assert_eq!(
        refs,
        vec![Some(&Value::Base('A')), Some(&Value::Base('A')), Some(&Value::Base('C'))]
    );
    assert!(records.iter().all(|r| r.count("reads_all") == Some(0)));
}

#[test]
fn strand_split_counts_each_direction() {
    let mut source = alignments()
        .with_read(AlignedRead::new(0, 100, b"A").with_flags(BAM_FREVERSE as u16))
        .with_read(AlignedRead::new(0, 100, b"A").with_flags(BAM_FREVERSE as u16));
    let options = PileupOptions::default().with_region(region(100, 101));
    let records = collect("coverage_strand", &mut source, None, &options).unwrap();

    assert_eq!(records[0].count("reads_all"), Some(3));
    assert_eq!(records[0].count("reads_all_fwd"), Some(1));
    assert_eq!(records[0].count("reads_all_rev"), Some(2));
}

#[test]
fn deletions_count_in_coverage_but_not_baseq() {
    let mut source = MemoryAlignments::new(&[("chrom1", 240)]).with_read(
        AlignedRead::new(0, 20, b"AC")
            .with_cigar(vec![Cigar::Match(1), Cigar::Del(1), Cigar::Match(1)])
            .with_qual(vec![20, 40]),
    );
    let options = PileupOptions::default()
        .with_region(region(21, 22))
        .with_truncate(true);
    let records = collect("baseq", &mut source, None, &options).unwrap();
    assert_eq!(records[0].count("reads_all"), Some(1));
    assert_eq!(records[0].get("mean_baseq"), Some(&Value::Float(0.0)));

    let mut reference = reference();
    let records = collect("variation", &mut source, Some(&mut reference), &options).unwrap();
    assert_eq!(records[0].count("deletions"), Some(1));
}

#[test]
fn empty_region_yields_nothing() {
    let options = PileupOptions::default().with_region(region(50, 50)).with_pad(true);
    let records = collect("coverage", &mut alignments(), None, &options).unwrap();
    assert!(records.is_empty());
}

#[test]
fn whole_genome_walk_without_region() {
    let mut source = MemoryAlignments::new(&[("chrom1", 4), ("chrom2", 3)])
        .with_read(AlignedRead::new(1, 1, b"GG"));
    let options = PileupOptions::default().with_pad(true);
    let records = collect("coverage", &mut source, None, &options).unwrap();

    let sites: Vec<(String, i64, i64)> = records
        .iter()
        .map(|r| (r.chrom().to_string(), r.pos(), r.count("reads_all").unwrap()))
        .collect();
    assert_eq!(
        sites,
        vec![
            ("chrom1".to_string(), 0, 0),
            ("chrom1".to_string(), 1, 0),
            ("chrom1".to_string(), 2, 0),
            ("chrom1".to_string(), 3, 0),
            ("chrom2".to_string(), 0, 0),
            ("chrom2".to_string(), 1, 1),
            ("chrom2".to_string(), 2, 1),
        ]
    );
}

#[test]
fn gc_schema_is_built_from_window() {
    let window = pileup_stats::GcWindow::new(50, None).unwrap();
    let schema = Schema::from(window);
    assert_eq!(schema.stat_type(), StatType::CoverageGc);
    assert_eq!(&schema.fields()[2..], &["gc", "reads_all", "reads_pp"].map(String::from));
}
