use dglab_protocol::PulseOperation;

pub struct Waveform {
    pub name_zh: &'static str,
    pub name_en: &'static str,
    pub name_ja: &'static str,
    pub frames: &'static [PulseOperation],
    /// Long waveforms are sent with fewer repeats to stay under the batch cap.
    pub long: bool,
}

impl Waveform {
    pub fn repeats(&self) -> usize {
        if self.long {
            3
        } else {
            5
        }
    }

    /// Frames as sent to the device: the pattern repeated [`Self::repeats`] times.
    pub fn batch(&self) -> Vec<PulseOperation> {
        let mut out = Vec::with_capacity(self.frames.len() * self.repeats());
        for _ in 0..self.repeats() {
            out.extend_from_slice(self.frames);
        }
        out
    }
}

pub fn get(index: usize) -> Option<&'static Waveform> {
    WAVEFORMS.get(index)
}

pub fn count() -> usize {
    WAVEFORMS.len()
}

const fn f(freq: u8, strength: [u8; 4]) -> PulseOperation {
    ([freq; 4], strength)
}

pub static WAVEFORMS: [Waveform; 16] = [
    Waveform {
        name_zh: "呼吸",
        name_en: "Breath",
        name_ja: "呼吸",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [0, 5, 10, 20]),
            f(10, [20, 25, 30, 40]),
            f(10, [40, 45, 50, 60]),
            f(10, [60, 65, 70, 80]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(0, [0, 0, 0, 0]),
            f(0, [0, 0, 0, 0]),
            f(0, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "潮汐",
        name_en: "Tide",
        name_ja: "潮汐",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(16, [0, 4, 8, 17]),
            f(21, [17, 21, 25, 33]),
            f(27, [50, 50, 50, 50]),
            f(33, [50, 54, 58, 67]),
            f(38, [67, 71, 75, 83]),
            f(44, [83, 87, 91, 100]),
            f(50, [100, 100, 100, 100]),
            f(44, [100, 98, 96, 92]),
            f(38, [92, 90, 88, 84]),
            f(33, [84, 82, 80, 76]),
            f(27, [76, 74, 72, 68]),
        ],
    },
    Waveform {
        name_zh: "连击",
        name_en: "Combo",
        name_ja: "連撃",
        long: false,
        frames: &[
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 92, 84, 67]),
            f(10, [67, 58, 50, 33]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 1]),
            f(10, [2, 2, 2, 2]),
        ],
    },
    Waveform {
        name_zh: "快速按捏",
        name_en: "Quick Pinch",
        name_ja: "クイックピンチ",
        long: false,
        frames: &[
            f(0, [0, 0, 0, 0]),
            f(0, [100, 100, 100, 100]),
            f(0, [0, 0, 0, 0]),
            f(0, [100, 100, 100, 100]),
            f(0, [0, 0, 0, 0]),
            f(0, [100, 100, 100, 100]),
            f(0, [0, 0, 0, 0]),
            f(0, [100, 100, 100, 100]),
        ],
    },
    Waveform {
        name_zh: "按捏渐强",
        name_en: "Pinch Ramp",
        name_ja: "ピンチ漸強",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [29, 29, 29, 29]),
            f(10, [0, 0, 0, 0]),
            f(10, [52, 52, 52, 52]),
            f(10, [2, 2, 2, 2]),
            f(10, [73, 73, 73, 73]),
            f(10, [0, 0, 0, 0]),
            f(10, [87, 87, 87, 87]),
            f(10, [0, 0, 0, 0]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "心跳节奏",
        name_en: "Heartbeat",
        name_ja: "心拍リズム",
        long: false,
        frames: &[
            f(110, [100, 100, 100, 100]),
            f(110, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
            f(10, [75, 75, 75, 75]),
            f(10, [75, 77, 79, 83]),
            f(10, [83, 85, 88, 92]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "压缩",
        name_en: "Compress",
        name_ja: "圧縮",
        long: true,
        frames: &[
            f(25, [100, 100, 100, 100]),
            f(24, [100, 100, 100, 100]),
            f(23, [100, 100, 100, 100]),
            f(22, [100, 100, 100, 100]),
            f(21, [100, 100, 100, 100]),
            f(20, [100, 100, 100, 100]),
            f(19, [100, 100, 100, 100]),
            f(18, [100, 100, 100, 100]),
            f(17, [100, 100, 100, 100]),
            f(16, [100, 100, 100, 100]),
            f(15, [100, 100, 100, 100]),
            f(14, [100, 100, 100, 100]),
            f(13, [100, 100, 100, 100]),
            f(12, [100, 100, 100, 100]),
            f(11, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
        ],
    },
    Waveform {
        name_zh: "节奏步伐",
        name_en: "Rhythm Steps",
        name_ja: "リズムステップ",
        long: true,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [0, 5, 10, 20]),
            f(10, [20, 25, 30, 40]),
            f(10, [40, 45, 50, 60]),
            f(10, [60, 65, 70, 80]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 6, 12, 25]),
            f(10, [25, 31, 38, 50]),
            f(10, [50, 56, 62, 75]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 8, 16, 33]),
            f(10, [33, 42, 50, 67]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 12, 25, 50]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [100, 100, 100, 100]),
        ],
    },
    Waveform {
        name_zh: "颗粒摩擦",
        name_en: "Grain Rub",
        name_ja: "粒子摩擦",
        long: false,
        frames: &[
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "渐变弹跳",
        name_en: "Fading Bounce",
        name_ja: "フェードバウンス",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [33, 33, 33, 33]),
            f(10, [66, 66, 66, 66]),
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "波浪涟漪",
        name_en: "Ripple",
        name_ja: "波紋",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [0, 12, 25, 50]),
            f(10, [100, 100, 100, 100]),
            f(10, [73, 73, 73, 73]),
        ],
    },
    Waveform {
        name_zh: "雨水冲刷",
        name_en: "Rain Wash",
        name_ja: "雨の洗い流し",
        long: false,
        frames: &[
            f(34, [33, 33, 33, 33]),
            f(34, [66, 66, 66, 66]),
            f(34, [100, 100, 100, 100]),
            f(34, [0, 0, 0, 0]),
            f(34, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "变速敲击",
        name_en: "Variable Tap",
        name_ja: "変速タップ",
        long: false,
        frames: &[
            f(10, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 0, 0, 0]),
            f(110, [100, 100, 100, 100]),
            f(110, [100, 100, 100, 100]),
            f(110, [100, 100, 100, 100]),
            f(110, [100, 100, 100, 100]),
            f(110, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "信号灯",
        name_en: "Beacon",
        name_ja: "信号灯",
        long: false,
        frames: &[
            f(197, [100, 100, 100, 100]),
            f(197, [100, 100, 100, 100]),
            f(197, [100, 100, 100, 100]),
            f(197, [100, 100, 100, 100]),
            f(10, [0, 0, 0, 0]),
            f(10, [0, 8, 16, 33]),
            f(10, [33, 42, 50, 67]),
            f(10, [100, 100, 100, 100]),
        ],
    },
    Waveform {
        name_zh: "挑逗1",
        name_en: "Tease 1",
        name_ja: "じらし1",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(10, [0, 6, 12, 25]),
            f(10, [25, 31, 38, 50]),
            f(10, [50, 56, 62, 75]),
            f(10, [100, 100, 100, 100]),
            f(0, [0, 0, 0, 0]),
            f(0, [0, 0, 0, 0]),
            f(0, [0, 0, 0, 0]),
        ],
    },
    Waveform {
        name_zh: "挑逗2",
        name_en: "Tease 2",
        name_ja: "じらし2",
        long: false,
        frames: &[
            f(10, [0, 0, 0, 0]),
            f(15, [1, 1, 1, 1]),
            f(20, [2, 2, 2, 2]),
            f(25, [3, 3, 3, 3]),
            f(30, [5, 5, 5, 5]),
            f(35, [7, 7, 7, 7]),
            f(40, [10, 10, 10, 10]),
            f(45, [13, 13, 13, 13]),
            f(50, [17, 17, 17, 17]),
            f(55, [22, 22, 22, 22]),
            f(60, [27, 27, 27, 27]),
            f(65, [33, 33, 33, 33]),
            f(70, [40, 40, 40, 40]),
            f(75, [47, 47, 47, 47]),
            f(80, [55, 55, 55, 55]),
            f(85, [64, 64, 64, 64]),
            f(90, [73, 73, 73, 73]),
            f(95, [83, 83, 83, 83]),
            f(100, [93, 93, 93, 93]),
            f(100, [100, 100, 100, 100]),
        ],
    },
];
