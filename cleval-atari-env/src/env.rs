mod config;
use crate::{build_emulator, AtariAct, AtariObs, Emulator, FRAME_IN_BYTES, FRAME_SIZE, N_STACK};
use anyhow::Result;
use cleval_core::{
    record::{Record, RecordValue},
    Env, Info, Step,
};
pub use config::AtariEnvConfig;
use image::{
    imageops::{grayscale, resize, FilterType::Triangle},
    ImageBuffer, Luma, Rgb,
};

/// Empty struct.
pub struct NullInfo;

impl Info for NullInfo {}

/// An Atari environment with DQN-style preprocessing.
///
/// Preprocessing is the same as in the link:
/// https://stable-baselines3.readthedocs.io/en/master/common/atari_wrappers.html#stable_baselines3.common.atari_wrappers.AtariWrapper,
/// without the training-only wrappers (episodic life, reward clipping).
pub struct AtariEnv {
    // Emulator behind the pipeline
    emulator: Box<dyn Emulator>,

    // Observation buffer for frame skipping
    obs_buffer: [Vec<u8>; 2],

    // Buffer for stacking frames
    frames: Vec<u8>,

    // Opens a window displaying the game
    render: bool,

    // Episode statistics
    ep_ret: f32,
    ep_len: usize,
}

impl AtariEnv {
    /// Returns the size of the action set.
    pub fn n_actions(&self) -> usize {
        self.emulator.n_actions()
    }

    fn raw_frame(emulator: &dyn Emulator, buf: &mut Vec<u8>) {
        buf.resize(emulator.width() * emulator.height() * 3, 0);
        emulator.render_rgb24(buf);
    }

    /// Advances 4 raw frames, accumulating the reward and max-pooling
    /// the last two frames.
    fn skip_and_max(&mut self, a: &AtariAct) -> (Vec<u8>, f32, i8) {
        let mut total_reward = 0f32;
        let mut done = 0;

        for i in 0..4 {
            total_reward += self.emulator.step(a.act);
            if i == 2 {
                Self::raw_frame(&*self.emulator, &mut self.obs_buffer[0]);
            } else if i == 3 {
                Self::raw_frame(&*self.emulator, &mut self.obs_buffer[1]);
            }
            if self.emulator.is_over() {
                done = 1;
                break;
            }
        }

        // Max pooling
        let obs = self.obs_buffer[0]
            .iter()
            .zip(self.obs_buffer[1].iter())
            .map(|(&a, &b)| a.max(b))
            .collect::<Vec<_>>();

        (obs, total_reward, done)
    }

    fn warp_and_grayscale(w: u32, h: u32, obs: Vec<u8>) -> Vec<u8> {
        // `obs.len()` is w * h * 3 where (w, h) is the size of the frame.
        let img = ImageBuffer::<Rgb<u8>, _>::from_vec(w, h, obs).unwrap();
        let img = resize(&img, FRAME_SIZE as u32, FRAME_SIZE as u32, Triangle);
        let img: ImageBuffer<Luma<u8>, _> = grayscale(&img);
        let buf = img.into_vec();
        assert_eq!(buf.len(), FRAME_IN_BYTES);
        buf
    }

    fn stack_frame(&mut self, obs: &[u8]) {
        self.frames.copy_within(FRAME_IN_BYTES.., 0);
        self.frames[(N_STACK - 1) * FRAME_IN_BYTES..].copy_from_slice(obs);
    }
}

impl Env for AtariEnv {
    type Config = AtariEnvConfig;
    type Obs = AtariObs;
    type Act = AtariAct;
    type Info = NullInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(Self {
            emulator: build_emulator(config, seed)?,
            obs_buffer: [vec![], vec![]],
            frames: vec![0; N_STACK * FRAME_IN_BYTES],
            render: config.render,
            ep_ret: 0.0,
            ep_len: 0,
        })
    }

    fn reset_with_seed(&mut self, seed: i64) -> Result<Self::Obs> {
        self.emulator.reset(seed);
        self.ep_ret = 0.0;
        self.ep_len = 0;

        let (w, h) = (self.emulator.width(), self.emulator.height());
        Self::raw_frame(&*self.emulator, &mut self.obs_buffer[0]);
        self.obs_buffer[1] = self.obs_buffer[0].clone();

        let obs = Self::warp_and_grayscale(w as u32, h as u32, self.obs_buffer[0].clone());
        for i in 0..N_STACK {
            self.frames[i * FRAME_IN_BYTES..(i + 1) * FRAME_IN_BYTES].copy_from_slice(&obs);
        }

        Ok(self.frames.clone().into())
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized,
    {
        let (obs, reward, is_terminated) = self.skip_and_max(act);
        let (w, h) = (self.emulator.width() as u32, self.emulator.height() as u32);
        let obs = Self::warp_and_grayscale(w, h, obs);
        self.stack_frame(&obs);

        self.ep_ret += reward;
        self.ep_len += 1;

        let record = if is_terminated == 1 {
            Record::from_slice(&[
                ("episode_return", RecordValue::Scalar(self.ep_ret)),
                ("episode_length", RecordValue::Scalar(self.ep_len as f32)),
            ])
        } else {
            Record::empty()
        };

        if self.render {
            self.emulator.render();
        }

        let step = Step::new(
            self.frames.clone().into(),
            act.clone(),
            vec![reward],
            vec![is_terminated],
            vec![0],
            NullInfo,
        );

        (step, record)
    }
}
