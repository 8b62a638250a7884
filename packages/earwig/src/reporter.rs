//! Human-readable per-cycle report.
//!
//! ```text
//!
//! <<< (4) this is dog (23.3%) >>>
//! dog: 23.3%
//! cat: 10.0%
//! ```

use std::io::{self, Stdout, Write};

use crate::{labels::ClassLabels, smoother::Prediction};

pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print the winner line followed by one line per class.
    pub fn report(
        &mut self,
        cycle: u64,
        labels: &ClassLabels,
        prediction: &Prediction,
    ) -> io::Result<()> {
        let winner = labels.get(prediction.winner).unwrap_or("?");

        writeln!(self.out)?;
        writeln!(
            self.out,
            "<<< ({cycle}) this is {winner} ({:.1}%) >>>",
            prediction.confidence()
        )?;
        for (name, score) in labels.iter().zip(&prediction.means) {
            writeln!(self.out, "{name}: {score:.1}%")?;
        }
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
