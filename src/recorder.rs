// src/recorder.rs
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use log::info;
use crate::signal::IngestedBatch;
/// Best-effort CSV log of filtered batches, one row per sample:
/// `group,timestamp_ms,ch0,ch1,...`. Groups narrower than the widest one
/// leave their trailing cells empty. Nothing is fsynced.
pub struct DataRecorder<W: Write> {
    writer: W,
    channels: usize,
    rows: u64,
}
impl DataRecorder<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, channels: usize) -> io::Result<Self> {
        let file = File::create(path.as_ref())?;
        info!("recording filtered batches to {}", path.as_ref().display());
        Self::new(BufWriter::new(file), channels)
    }
}
impl<W: Write> DataRecorder<W> {
    /// `channels` is the widest group that will be recorded.
    pub fn new(mut writer: W, channels: usize) -> io::Result<Self> {
        write!(writer, "group,timestamp_ms")?;
        for ch in 0..channels {
            write!(writer, ",ch{ch}")?;
        }
        writeln!(writer)?;
        Ok(Self {
            writer,
            channels,
            rows: 0,
        })
    }
    pub fn write_batch(&mut self, batch: &IngestedBatch) -> io::Result<()> {
        if batch.filtered.len() > self.channels {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "`{}` has {} channels, recording header has {}",
                    batch.group,
                    batch.filtered.len(),
                    self.channels
                ),
            ));
        }
        let padding = self.channels - batch.filtered.len();
        for (i, t) in batch.timestamps.iter().enumerate() {
            write!(self.writer, "{},{:.3}", batch.group, t)?;
            for channel in &batch.filtered {
                write!(self.writer, ",{:.6}", channel[i])?;
            }
            for _ in 0..padding {
                write!(self.writer, ",")?;
            }
            writeln!(self.writer)?;
            self.rows += 1;
        }
        Ok(())
    }
    pub fn rows(&self) -> u64 {
        self.rows
    }
    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        info!("recording closed after {} row(s)", self.rows);
        Ok(self.writer)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn batch(group: &str, filtered: Vec<Vec<f64>>) -> IngestedBatch {
        let len = filtered.first().map(|c| c.len()).unwrap_or(0);
        IngestedBatch {
            group: group.into(),
            timestamps: (0..len).map(|i| 10.0 + 2.0 * i as f64).collect(),
            filtered,
        }
    }
    #[test]
    fn writes_one_row_per_sample() {
        let mut recorder = DataRecorder::new(Vec::new(), 2).unwrap();
        recorder
            .write_batch(&batch("emg", vec![vec![0.5, -0.25], vec![1.0, 2.0]]))
            .unwrap();
        assert_eq!(recorder.rows(), 2);
        let text = String::from_utf8(recorder.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "group,timestamp_ms,ch0,ch1");
        assert_eq!(lines[1], "emg,10.000,0.500000,1.000000");
        assert_eq!(lines[2], "emg,12.000,-0.250000,2.000000");
    }
    #[test]
    fn header_and_rows_have_equal_width() {
        let mut recorder = DataRecorder::new(Vec::new(), 3).unwrap();
        recorder
            .write_batch(&batch("emg", vec![vec![1.0], vec![2.0], vec![3.0]]))
            .unwrap();
        recorder.write_batch(&batch("gyro", vec![vec![4.0]])).unwrap();
        let text = String::from_utf8(recorder.finish().unwrap()).unwrap();
        let widths: Vec<usize> = text.lines().map(|l| l.split(',').count()).collect();
        assert_eq!(widths, vec![5, 5, 5]);
        assert_eq!(text.lines().nth(2), Some("gyro,10.000,4.000000,,"));
    }
    #[test]
    fn rejects_groups_wider_than_header() {
        let mut recorder = DataRecorder::new(Vec::new(), 1).unwrap();
        let err = recorder
            .write_batch(&batch("emg", vec![vec![1.0], vec![2.0]]))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(recorder.rows(), 0);
    }
}
