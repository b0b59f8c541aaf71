//! Pipeline entry point.
use structopt::StructOpt;

#[macro_use]
extern crate log;

use macaw::error::Error;
use macaw::pipelines::{Collocation, Pipeline, Scoring};
use macaw::processing::{convert, prune};

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Macaw::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Macaw::Convert(c) => {
            convert::convert_corpus(&c.src, &c.dst)?;
        }
        cli::Macaw::Collocate(c) => {
            let pipeline = Collocation::new(c.src, c.dst, c.combination_size);
            pipeline.run()?;
        }
        cli::Macaw::Score(s) => {
            let pipeline = Scoring::new(
                s.src,
                s.dst,
                s.index,
                s.modularity,
                s.lexicon,
                s.toxic_terms,
                s.stopwords,
                s.classes,
                s.workers,
                s.shuffle,
                s.oversize_limit,
            );
            let summary = pipeline.run()?;
            info!("{:?}", summary);
        }
        cli::Macaw::Prune(p) => {
            let stats = prune::prune_graph(&p.nodes, &p.edges, &p.dst, p.cutoff)?;
            info!("{:?}", stats);
        }
    };
    Ok(())
}
