use super::evolution_engine::ProgressCallback;
use crate::engines::evaluation::Individual;

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, generation: usize, best: &Individual, mutation_rate: f64) {
        log::info!(
            "Generation {} | fit {:.2} | ret {:.2}% | mdd {:.2}% | calmar {:.2} | sortino {:.2} | trades {} | mut {:.4}",
            generation + 1,
            best.fitness,
            best.metrics.total_return_pct,
            best.metrics.max_drawdown_pct,
            best.metrics.calmar,
            best.metrics.sortino,
            best.metrics.n_trades,
            mutation_rate
        );
    }

    fn on_mutation_escalated(&mut self, generation: usize, mutation_rate: f64) {
        log::warn!(
            "Generation {}: fitness stagnated, mutation rate now {:.4}",
            generation + 1,
            mutation_rate
        );
    }
}

pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_generation_complete(&mut self, _generation: usize, _best: &Individual, _mutation_rate: f64) {}
    fn on_mutation_escalated(&mut self, _generation: usize, _mutation_rate: f64) {}
}

// For callers running the optimizer on another thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete { generation: usize, best_fitness: f64, mutation_rate: f64 },
    MutationEscalated { generation: usize, mutation_rate: f64 },
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, generation: usize, best: &Individual, mutation_rate: f64) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            best_fitness: best.fitness,
            mutation_rate,
        });
    }

    fn on_mutation_escalated(&mut self, generation: usize, mutation_rate: f64) {
        let _ = self.sender.send(ProgressMessage::MutationEscalated {
            generation,
            mutation_rate,
        });
    }
}
