use super::{AlignmentSource, Columns, Contig, PileupColumn, Segment};
use crate::error::Result;
use crate::types::Interval;
use crate::utils::bam_reader::BamReaderFactory;
use rust_htslib::bam::pileup::{Alignment, Indel, Pileup};
use rust_htslib::bam::{self, FetchDefinition, Read};
use rust_htslib::htslib::{BAM_CHARD_CLIP, BAM_CIGAR_MASK, BAM_CSOFT_CLIP};
use std::path::Path;
use std::sync::Arc;

/// Alignment source backed by an indexed BAM/CRAM file.
pub struct BamSource {
    reader: bam::IndexedReader,
    contigs: Vec<Contig>,
}

impl BamSource {
    pub fn from_path(path: impl AsRef<Path>, reference: Option<&Path>) -> Result<Self> {
        let reader = BamReaderFactory::open_indexed(path.as_ref(), reference)?;
        let header = reader.header();

        let contigs = (0..header.target_count())
            .map(|tid| Contig {
                tid,
                name: Arc::from(String::from_utf8_lossy(header.tid2name(tid)).as_ref()),
                len: header.target_len(tid).unwrap_or(0),
            })
            .collect();

        Ok(Self { reader, contigs })
    }
}

impl AlignmentSource for BamSource {
    fn contigs(&self) -> Vec<Contig> {
        self.contigs.clone()
    }

    fn pileup(&mut self, target: Option<&Interval>, max_depth: u32) -> Result<Columns<'_>> {
        match target {
            Some(iv) => self.reader.fetch((iv.tid, iv.start, iv.end))?,
            None => self.reader.fetch(FetchDefinition::All)?,
        }

        let mut pileups = self.reader.pileup();
        // htslib treats a zero cap as "use the default"; the iterator applies the real cap.
        pileups.set_max_depth(max_depth.max(1));

        let cap = max_depth as usize;
        Ok(Box::new(pileups.map(move |p| -> Result<PileupColumn> {
            let pileup = p?;
            Ok(column_from_pileup(&pileup, cap))
        })))
    }
}

fn column_from_pileup(pileup: &Pileup, max_depth: usize) -> PileupColumn {
    PileupColumn {
        tid: pileup.tid(),
        pos: pileup.pos() as u64,
        segments: pileup
            .alignments()
            .take(max_depth)
            .map(|aln| segment_from_alignment(&aln))
            .collect(),
    }
}

fn segment_from_alignment(aln: &Alignment) -> Segment {
    let record = aln.record();
    let is_refskip = aln.is_refskip();
    // htslib flags reference skips as deletions too
    let is_del = aln.is_del() && !is_refskip;

    let qpos = if is_del || is_refskip { None } else { aln.qpos() };
    let base = qpos.map(|q| record.seq()[q].to_ascii_uppercase());
    let qual = qpos.and_then(|q| record.qual().get(q).copied());

    Segment {
        flags: record.flags(),
        mapq: record.mapq(),
        tlen: record.insert_size(),
        base,
        qual,
        is_del,
        is_refskip,
        insertion: matches!(aln.indel(), Indel::Ins(_)),
        soft_clipped: has_soft_clip(record.raw_cigar()),
        mate_other_chr: record.is_paired() && record.mtid() != record.tid(),
    }
}

/// Soft clips sit at either end of the CIGAR, outside any hard clips.
fn has_soft_clip(raw_cigar: &[u32]) -> bool {
    fn clipped_end<'a>(ops: impl Iterator<Item = &'a u32>) -> bool {
        ops.map(|op| op & BAM_CIGAR_MASK)
            .find(|&op| op != BAM_CHARD_CLIP)
            == Some(BAM_CSOFT_CLIP)
    }
    clipped_end(raw_cigar.iter()) || clipped_end(raw_cigar.iter().rev())
}
